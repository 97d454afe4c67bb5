use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::notifications::models::{
    Notification, NotificationData, NotificationPage, NotificationType,
};
use crate::shared::types::PaginationQuery;

/// Query parameters for listing notifications
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct NotificationQueryDto {
    /// Page number (1-indexed, default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Only return unread notifications
    #[serde(default)]
    pub unread_only: bool,
}

impl NotificationQueryDto {
    pub fn pagination(&self) -> PaginationQuery {
        let defaults = PaginationQuery::default();
        PaginationQuery::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponseDto {
    pub id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: NotificationData,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponseDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            data: n.data.0,
            read: n.read,
            read_at: n.read_at,
            created_at: n.created_at,
        }
    }
}

/// One page of notifications plus the recipient's unread count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationListDto {
    pub notifications: Vec<NotificationResponseDto>,
    pub total: i64,
    pub unread_count: i64,
    pub page: i64,
    pub pages: i64,
}

impl NotificationListDto {
    pub fn from_page(page: NotificationPage, pagination: &PaginationQuery) -> Self {
        let limit = pagination.limit();
        Self {
            notifications: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            unread_count: page.unread_count,
            page: pagination.page(),
            pages: (page.total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponseDto {
    pub updated: u64,
}
