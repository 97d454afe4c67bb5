use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for comment, joined with the author's display name
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: String,
    pub user_name: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub report_id: Uuid,
    pub user_id: String,
    pub text: String,
}
