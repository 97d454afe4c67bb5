use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::{NewNotification, Notification, NotificationPage};
use crate::shared::types::PaginationQuery;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, notification_type, title, message, data, read, read_at, created_at";

/// Notification sink. Every read or state change is scoped to the recipient.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification>;

    /// Newest first
    async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
        pagination: &PaginationQuery,
    ) -> Result<NotificationPage>;

    async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<Option<Notification>>;

    /// Returns the number of notifications that changed
    async fn mark_all_read(&self, user_id: &str) -> Result<u64>;

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;
}

/// PostgreSQL-backed notification store
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, notification: NewNotification) -> Result<Notification> {
        let sql = format!(
            r#"
            INSERT INTO notifications (id, user_id, notification_type, title, message, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&sql)
            .bind(Uuid::now_v7())
            .bind(&notification.user_id)
            .bind(notification.notification_type)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(Json(&notification.data))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create notification: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
        pagination: &PaginationQuery,
    ) -> Result<NotificationPage> {
        let (total, unread_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE $2 = FALSE OR read = FALSE) AS total,
                COUNT(*) FILTER (WHERE read = FALSE) AS unread_count
            FROM notifications
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count notifications: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE user_id = $1 AND ($2 = FALSE OR read = FALSE)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
            NOTIFICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(unread_only)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list notifications: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(NotificationPage {
            items,
            total,
            unread_count,
        })
    }

    async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<Option<Notification>> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );
        sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark notification read: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE, read_at = NOW() WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark all notifications read: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete notification: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub mod memory {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryNotificationStore {
        notifications: Mutex<Vec<Notification>>,
        failing: AtomicBool,
    }

    impl InMemoryNotificationStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent `create` fail.
        pub fn fail_writes(&self) {
            self.failing.store(true, Ordering::SeqCst);
        }

        pub fn all_for(&self, user_id: &str) -> Vec<Notification> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.user_id == user_id)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl NotificationStore for InMemoryNotificationStore {
        async fn create(&self, notification: NewNotification) -> Result<Notification> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(AppError::Internal("notification sink unavailable".to_string()));
            }
            let created = Notification {
                id: Uuid::now_v7(),
                user_id: notification.user_id,
                notification_type: notification.notification_type,
                title: notification.title,
                message: notification.message,
                data: Json(notification.data),
                read: false,
                read_at: None,
                created_at: Utc::now(),
            };
            self.notifications.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn list(
            &self,
            user_id: &str,
            unread_only: bool,
            pagination: &PaginationQuery,
        ) -> Result<NotificationPage> {
            let mut mine = self.all_for(user_id);
            let unread_count = mine.iter().filter(|n| !n.read).count() as i64;
            if unread_only {
                mine.retain(|n| !n.read);
            }
            mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let total = mine.len() as i64;
            let items = mine
                .into_iter()
                .skip(pagination.offset() as usize)
                .take(pagination.limit() as usize)
                .collect();
            Ok(NotificationPage {
                items,
                total,
                unread_count,
            })
        }

        async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<Option<Notification>> {
            let mut all = self.notifications.lock().unwrap();
            Ok(all
                .iter_mut()
                .find(|n| n.id == id && n.user_id == user_id)
                .map(|n| {
                    n.read = true;
                    n.read_at.get_or_insert_with(Utc::now);
                    n.clone()
                }))
        }

        async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
            let mut all = self.notifications.lock().unwrap();
            let mut changed = 0;
            for n in all.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
                n.read = true;
                n.read_at = Some(Utc::now());
                changed += 1;
            }
            Ok(changed)
        }

        async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
            let mut all = self.notifications.lock().unwrap();
            let before = all.len();
            all.retain(|n| !(n.id == id && n.user_id == user_id));
            Ok(all.len() < before)
        }
    }
}
