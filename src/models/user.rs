use serde::Serialize;
use sqlx::FromRow;

/// User model - lookup target for issue originator/assignee references
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}
