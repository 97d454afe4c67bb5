use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::badges::dtos::BadgeDto;
use crate::features::badges::BadgeDefinition;
use crate::features::users::models::{NotificationSettings, NotificationSettingsUpdate, User};
use crate::shared::validation::validate_language;

/// Denormalized per-user counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserStatsDto {
    pub total_reports: i32,
    pub total_likes_received: i32,
    pub total_comments_received: i32,
    pub emergency_reports: i32,
}

impl From<&User> for UserStatsDto {
    fn from(u: &User) -> Self {
        Self {
            total_reports: u.total_reports,
            total_likes_received: u.total_likes_received,
            total_comments_received: u.total_comments_received,
            emergency_reports: u.emergency_reports,
        }
    }
}

/// Complete user profile response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponseDto {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub language: String,
    pub points: i32,
    pub badges: Vec<String>,
    pub stats: UserStatsDto,
    pub notification_settings: NotificationSettings,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponseDto {
    fn from(u: User) -> Self {
        Self {
            stats: UserStatsDto::from(&u),
            notification_settings: u.notification_settings(),
            id: u.id,
            name: u.name,
            email: u.email,
            language: u.language,
            points: u.points,
            badges: u.badges,
            created_at: u.created_at,
        }
    }
}

/// Request DTO for changing the interface language
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateLanguageDto {
    /// One of: en, hi, mr, ta, te, bn, gu, kn
    #[validate(custom(function = "validate_language"))]
    pub language: String,
}

/// Request DTO for notification preferences; omitted fields are unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNotificationSettingsDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_updates: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
}

impl From<UpdateNotificationSettingsDto> for NotificationSettingsUpdate {
    fn from(dto: UpdateNotificationSettingsDto) -> Self {
        Self {
            status_updates: dto.status_updates,
            comments: dto.comments,
            likes: dto.likes,
            email: dto.email,
        }
    }
}

/// Badges and points of one user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBadgesDto {
    pub user_id: String,
    pub name: String,
    pub points: i32,
    pub badges: Vec<BadgeDto>,
    pub stats: UserStatsDto,
}

impl UserBadgesDto {
    pub fn new(user: User, badges: Vec<BadgeDefinition>) -> Self {
        Self {
            stats: UserStatsDto::from(&user),
            badges: badges.iter().map(BadgeDto::from).collect(),
            user_id: user.id,
            name: user.name,
            points: user.points,
        }
    }
}
