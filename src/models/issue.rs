use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// Lifecycle state of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum State {
    Open,
    Inprogress,
    Resolved,
    Closed,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Open => "OPEN",
            State::Inprogress => "INPROGRESS",
            State::Resolved => "RESOLVED",
            State::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Priority {
    Minor,
    Normal,
    Major,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Minor => "MINOR",
            Priority::Normal => "NORMAL",
            Priority::Major => "MAJOR",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue model - the tracked entity, mirrored into the search index
///
/// `id` is None until the first persist assigns one. Originator and assignee
/// are weak references to users, stored as plain ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub created: NaiveDate,
    pub state: Option<State>,
    pub priority: Option<Priority>,
    #[serde(default, with = "attachment_b64")]
    pub attachment: Option<Vec<u8>>,
    pub attachment_content_type: Option<String>,
    pub comment: Option<String>,
    pub originator_id: Option<i64>,
    pub assignee_id: Option<i64>,
}

/// Equality is identifier equality only. Two issues that have not been
/// persisted yet (id = None) are never equal, even field-for-field.
impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Incoming issue payload for create/update requests
///
/// Required fields are optional here so that missing values surface as a
/// validation error with an error key instead of a bare decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueDraft {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created: Option<NaiveDate>,
    pub state: Option<State>,
    pub priority: Option<Priority>,
    #[serde(default, with = "attachment_b64")]
    pub attachment: Option<Vec<u8>>,
    pub attachment_content_type: Option<String>,
    pub comment: Option<String>,
    pub originator_id: Option<i64>,
    pub assignee_id: Option<i64>,
}

impl IssueDraft {
    /// Validates the draft and converts it into an [`Issue`] ready to persist
    pub fn validate(self) -> AppResult<Issue> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::validation("namenull", "name is required"))?;
        let description = self
            .description
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| AppError::validation("descriptionnull", "description is required"))?;
        let created = self
            .created
            .ok_or_else(|| AppError::validation("creatednull", "created date is required"))?;

        // Attachment blob and content type travel together
        if self.attachment.is_some() != self.attachment_content_type.is_some() {
            return Err(AppError::validation(
                "attachmentincomplete",
                "attachment and attachment_content_type must both be present or both absent",
            ));
        }

        Ok(Issue {
            id: self.id,
            name,
            description,
            created,
            state: self.state,
            priority: self.priority,
            attachment: self.attachment,
            attachment_content_type: self.attachment_content_type,
            comment: self.comment,
            originator_id: self.originator_id,
            assignee_id: self.assignee_id,
        })
    }
}

/// Base64 (de)serialization for the attachment blob, matching how binary
/// columns travel in JSON bodies
mod attachment_b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(s) => STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
