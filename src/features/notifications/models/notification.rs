use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Notification type enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    StatusUpdate,
    Comment,
    Like,
    BadgeEarned,
    Escalation,
    Resolution,
    EmergencyAlert,
    System,
}

/// Structured payload attached to a notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl NotificationData {
    pub fn report(report_id: Uuid) -> Self {
        Self {
            report_id: Some(report_id),
            link: Some(format!("/reports/{}", report_id)),
            ..Default::default()
        }
    }

    pub fn comment(report_id: Uuid, comment_id: Uuid) -> Self {
        Self {
            comment_id: Some(comment_id),
            ..Self::report(report_id)
        }
    }

    pub fn badge(badge_id: &str) -> Self {
        Self {
            badge: Some(badge_id.to_string()),
            link: Some("/profile/badges".to_string()),
            ..Default::default()
        }
    }
}

/// Database model for notification
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: Json<NotificationData>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: NotificationData,
}

/// One page of a user's notifications
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    pub total: i64,
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_omits_empty_fields() {
        let json = serde_json::to_value(NotificationData::badge("first_report")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"badge": "first_report", "link": "/profile/badges"})
        );
    }

    #[test]
    fn test_comment_payload_links_report() {
        let report_id = Uuid::now_v7();
        let comment_id = Uuid::now_v7();
        let data = NotificationData::comment(report_id, comment_id);
        assert_eq!(data.report_id, Some(report_id));
        assert_eq!(data.comment_id, Some(comment_id));
        assert_eq!(data.link, Some(format!("/reports/{}", report_id)));
    }
}
