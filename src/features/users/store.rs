use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{NotificationSettingsUpdate, User, UserIdentity};

const USER_COLUMNS: &str = r#"
    id, name, email, language,
    notify_status_updates, notify_comments, notify_likes, notify_email,
    total_reports, total_likes_received, total_comments_received, emergency_reports,
    badges, points, created_at, updated_at
"#;

/// User rows and their denormalized statistics.
///
/// Counter updates are single increments and never read the current value first.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the user on first sight, otherwise return the stored row.
    async fn ensure(&self, identity: &UserIdentity) -> Result<User>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Count a newly submitted report and award its points.
    async fn record_report(&self, id: &str, is_emergency: bool, points: i32) -> Result<()>;

    /// Adjust `total_likes_received` by `delta`, never going below zero.
    async fn adjust_likes_received(&self, id: &str, delta: i32) -> Result<()>;

    async fn increment_comments_received(&self, id: &str) -> Result<()>;

    /// Add the badge and its points unless already held. Returns whether it was granted.
    async fn grant_badge(&self, id: &str, badge_id: &str, points: i32) -> Result<bool>;

    async fn update_language(&self, id: &str, language: &str) -> Result<Option<User>>;

    async fn update_notification_settings(
        &self,
        id: &str,
        update: NotificationSettingsUpdate,
    ) -> Result<Option<User>>;
}

/// PostgreSQL-backed user store
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user or refresh an empty name. An email already claimed by
    /// another account is left unset.
    async fn upsert(
        &self,
        identity: &UserIdentity,
        email: Option<&str>,
    ) -> std::result::Result<User, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO users (id, name, email)
            VALUES (
                $1,
                $2,
                (SELECT $3::TEXT WHERE NOT EXISTS (SELECT 1 FROM users WHERE email = $3))
            )
            ON CONFLICT (id) DO UPDATE
            SET name = CASE WHEN users.name = '' THEN EXCLUDED.name ELSE users.name END
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&identity.id)
            .bind(&identity.name)
            .bind(email)
            .fetch_one(&self.pool)
            .await
    }

    async fn execute(&self, sql: &str, id: &str, what: &str) -> Result<()> {
        sqlx::query(sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to {}: {:?}", what, e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ensure(&self, identity: &UserIdentity) -> Result<User> {
        let provisioned = match self.upsert(identity, identity.email.as_deref()).await {
            // A concurrent provision claimed the email between the guard and the insert
            Err(e) if identity.email.is_some() && is_unique_violation(&e) => {
                tracing::warn!(
                    "Email for user {} was claimed concurrently, provisioning without it",
                    identity.id
                );
                self.upsert(identity, None).await
            }
            result => result,
        };

        provisioned.map_err(|e| {
            tracing::error!("Failed to provision user {}: {:?}", identity.id, e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn record_report(&self, id: &str, is_emergency: bool, points: i32) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET
                total_reports = total_reports + 1,
                emergency_reports = emergency_reports + CASE WHEN $2 THEN 1 ELSE 0 END,
                points = points + $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(is_emergency)
        .bind(points)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record report for user: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(())
    }

    async fn adjust_likes_received(&self, id: &str, delta: i32) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET total_likes_received = GREATEST(total_likes_received + $2, 0), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to adjust likes received: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(())
    }

    async fn increment_comments_received(&self, id: &str) -> Result<()> {
        self.execute(
            r#"
            UPDATE users
            SET total_comments_received = total_comments_received + 1, updated_at = NOW()
            WHERE id = $1
            "#,
            id,
            "increment comments received",
        )
        .await
    }

    async fn grant_badge(&self, id: &str, badge_id: &str, points: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET badges = array_append(badges, $2), points = points + $3, updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(badges))
            "#,
        )
        .bind(id)
        .bind(badge_id)
        .bind(points)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to grant badge {}: {:?}", badge_id, e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_language(&self, id: &str, language: &str) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET language = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(language)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update language: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update_notification_settings(
        &self,
        id: &str,
        update: NotificationSettingsUpdate,
    ) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET
                notify_status_updates = COALESCE($2, notify_status_updates),
                notify_comments = COALESCE($3, notify_comments),
                notify_likes = COALESCE($4, notify_likes),
                notify_email = COALESCE($5, notify_email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(update.status_updates)
            .bind(update.comments)
            .bind(update.likes)
            .bind(update.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update notification settings: {:?}", e);
                AppError::Database(e)
            })
    }
}


#[cfg(test)]
mod tests {
    use super::memory::InMemoryUserStore;
    use super::*;

    fn identity(id: &str, email: &str) -> UserIdentity {
        UserIdentity {
            id: id.to_string(),
            name: id.to_string(),
            email: Some(email.to_string()),
        }
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_shared_email_provisions_both_users() {
        let store = InMemoryUserStore::new();

        let asha = identity("asha", "shared@civicworks.in");
        let ravi = identity("ravi", "shared@civicworks.in");
        let (first, second) = tokio::join!(store.ensure(&asha), store.ensure(&ravi));
        let (first, second) = (first.unwrap(), second.unwrap());

        let emails = [first.email, second.email];
        assert_eq!(emails.iter().filter(|e| e.is_some()).count(), 1);
        assert!(store.find_by_id("asha").await.unwrap().is_some());
        assert!(store.find_by_id("ravi").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ensure_keeps_existing_row() {
        let store = InMemoryUserStore::new();
        store
            .ensure(&identity("asha", "asha@civicworks.in"))
            .await
            .unwrap();
        store.record_report("asha", false, 10).await.unwrap();

        let again = store
            .ensure(&identity("asha", "asha@civicworks.in"))
            .await
            .unwrap();
        assert_eq!(again.total_reports, 1);
        assert_eq!(again.email.as_deref(), Some("asha@civicworks.in"));
    }
}
