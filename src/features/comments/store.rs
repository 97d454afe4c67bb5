use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::comments::models::{Comment, NewComment};

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert(&self, comment: NewComment) -> Result<Comment>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Newest first
    async fn list_by_report(&self, report_id: Uuid) -> Result<Vec<Comment>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// PostgreSQL-backed comment store. Author names are joined from `users`.
pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (id, report_id, user_id, text)
                VALUES ($1, $2, $3, $4)
                RETURNING id, report_id, user_id, text, created_at
            )
            SELECT i.id, i.report_id, i.user_id, u.name AS user_name, i.text, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(comment.report_id)
        .bind(&comment.user_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert comment: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.report_id, c.user_id, u.name AS user_name, c.text, c.created_at
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch comment: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_by_report(&self, report_id: Uuid) -> Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.report_id, c.user_id, u.name AS user_name, c.text, c.created_at
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.report_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub mod memory {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use super::*;
    use crate::features::users::store::UserStore;

    pub struct InMemoryCommentStore {
        comments: Mutex<Vec<Comment>>,
        users: Arc<dyn UserStore>,
    }

    impl InMemoryCommentStore {
        pub fn new(users: Arc<dyn UserStore>) -> Self {
            Self {
                comments: Mutex::new(Vec::new()),
                users,
            }
        }
    }

    #[async_trait]
    impl CommentStore for InMemoryCommentStore {
        async fn insert(&self, comment: NewComment) -> Result<Comment> {
            let user_name = self
                .users
                .find_by_id(&comment.user_id)
                .await?
                .map(|u| u.name);
            let created = Comment {
                id: Uuid::now_v7(),
                report_id: comment.report_id,
                user_id: comment.user_id,
                user_name,
                text: comment.text,
                created_at: Utc::now(),
            };
            self.comments.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
            Ok(self
                .comments
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }

        async fn list_by_report(&self, report_id: Uuid) -> Result<Vec<Comment>> {
            let mut found: Vec<Comment> = self
                .comments
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.report_id == report_id)
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(found)
        }

        async fn delete(&self, id: Uuid) -> Result<bool> {
            let mut comments = self.comments.lock().unwrap();
            let before = comments.len();
            comments.retain(|c| c.id != id);
            Ok(comments.len() < before)
        }
    }
}
