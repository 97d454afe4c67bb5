use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::comments::models::Comment;

/// Request DTO for commenting on a report. Length is checked after trimming.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentDto {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: String,
    pub user_name: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            report_id: c.report_id,
            user_id: c.user_id,
            user_name: c.user_name,
            text: c.text,
            created_at: c.created_at,
        }
    }
}
