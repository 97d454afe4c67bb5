use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::badges::BadgeStats;

/// Database model for user
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub language: String,
    pub notify_status_updates: bool,
    pub notify_comments: bool,
    pub notify_likes: bool,
    pub notify_email: bool,
    pub total_reports: i32,
    pub total_likes_received: i32,
    pub total_comments_received: i32,
    pub emergency_reports: i32,
    pub badges: Vec<String>,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn badge_stats(&self) -> BadgeStats {
        BadgeStats {
            total_reports: self.total_reports,
            total_likes_received: self.total_likes_received,
            total_comments_received: self.total_comments_received,
            emergency_reports: self.emergency_reports,
            false_reports_caught: 0,
        }
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            status_updates: self.notify_status_updates,
            comments: self.notify_comments,
            likes: self.notify_likes,
            email: self.notify_email,
        }
    }
}

/// Identity used to provision a user row on first use
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

impl From<&AuthenticatedUser> for UserIdentity {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.sub.clone(),
            name: user.display_name(),
            email: user.email.clone(),
        }
    }
}

/// Stored notification preferences. They are exposed to clients but do not
/// gate notification creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationSettings {
    pub status_updates: bool,
    pub comments: bool,
    pub likes: bool,
    pub email: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            status_updates: true,
            comments: true,
            likes: true,
            email: false,
        }
    }
}

/// Partial update; `None` leaves the stored value unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationSettingsUpdate {
    pub status_updates: Option<bool>,
    pub comments: Option<bool>,
    pub likes: Option<bool>,
    pub email: Option<bool>,
}

impl NotificationSettingsUpdate {
    pub fn apply_to(&self, settings: NotificationSettings) -> NotificationSettings {
        NotificationSettings {
            status_updates: self.status_updates.unwrap_or(settings.status_updates),
            comments: self.comments.unwrap_or(settings.comments),
            likes: self.likes.unwrap_or(settings.likes),
            email: self.email.unwrap_or(settings.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_update_keeps_unset_fields() {
        let update = NotificationSettingsUpdate {
            email: Some(true),
            likes: Some(false),
            ..Default::default()
        };
        let settings = update.apply_to(NotificationSettings::default());
        assert!(settings.status_updates);
        assert!(settings.comments);
        assert!(!settings.likes);
        assert!(settings.email);
    }
}
