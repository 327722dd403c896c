//! Test fixtures and data builders

use issuetrack::models::IssueDraft;
use serde_json::{json, Value};

/// Builds issue payloads with sensible defaults
pub struct IssueBuilder {
    id: Option<i64>,
    name: String,
    description: String,
    created: String,
    state: Option<String>,
    priority: Option<String>,
    attachment: Option<String>,
    attachment_content_type: Option<String>,
    comment: Option<String>,
    originator_id: Option<i64>,
    assignee_id: Option<i64>,
}

impl Default for IssueBuilder {
    fn default() -> Self {
        Self {
            id: None,
            name: "Broken login page".to_string(),
            description: "Login fails with a blank screen".to_string(),
            created: "2024-01-15".to_string(),
            state: Some("OPEN".to_string()),
            priority: Some("NORMAL".to_string()),
            attachment: None,
            attachment_content_type: None,
            comment: None,
            originator_id: None,
            assignee_id: None,
        }
    }
}

impl IssueBuilder {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn created(mut self, created: &str) -> Self {
        self.created = created.to_string();
        self
    }

    pub fn state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn priority(mut self, priority: &str) -> Self {
        self.priority = Some(priority.to_string());
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn attachment(mut self, base64: &str, content_type: &str) -> Self {
        self.attachment = Some(base64.to_string());
        self.attachment_content_type = Some(content_type.to_string());
        self
    }

    pub fn originator(mut self, user_id: i64) -> Self {
        self.originator_id = Some(user_id);
        self
    }

    pub fn assignee(mut self, user_id: i64) -> Self {
        self.assignee_id = Some(user_id);
        self
    }

    /// JSON body for API requests
    pub fn build(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "created": self.created,
            "state": self.state,
            "priority": self.priority,
            "attachment": self.attachment,
            "attachment_content_type": self.attachment_content_type,
            "comment": self.comment,
            "originator_id": self.originator_id,
            "assignee_id": self.assignee_id,
        })
    }

    /// Draft for direct service calls
    pub fn draft(&self) -> IssueDraft {
        serde_json::from_value(self.build()).expect("Fixture draft must deserialize")
    }
}
