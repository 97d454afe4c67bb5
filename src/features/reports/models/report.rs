use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::{ESCALATION_LEVEL_1_AFTER_DAYS, ESCALATION_LEVEL_2_AFTER_DAYS};

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    UnderReview,
    InProgress,
    Resolved,
    Rejected,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::UnderReview => write!(f, "under_review"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl ReportStatus {
    /// Human readable form used in notification messages
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::UnderReview => "Under review",
            ReportStatus::InProgress => "In progress",
            ReportStatus::Resolved => "Resolved",
            ReportStatus::Rejected => "Rejected",
        }
    }
}

/// Report priority enum matching database enum. Declaration order is severity order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "report_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportPriority::Low => write!(f, "low"),
            ReportPriority::Medium => write!(f, "medium"),
            ReportPriority::High => write!(f, "high"),
            ReportPriority::Critical => write!(f, "critical"),
        }
    }
}

/// One append-only entry of a report's status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryEntry {
    pub status: ReportStatus,
    pub changed_by: String,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StatusHistoryEntry {
    pub fn new(status: ReportStatus, changed_by: &str, note: impl Into<String>) -> Self {
        Self {
            status,
            changed_by: changed_by.to_string(),
            note: Some(note.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub owner_id: String,
    pub category: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub photos: Vec<String>,
    pub after_photos: Vec<String>,
    pub status: ReportStatus,
    pub status_history: Json<Vec<StatusHistoryEntry>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub is_emergency: bool,
    pub priority: ReportPriority,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_level: i16,
    pub escalation_reason: Option<String>,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub false_reports: Vec<String>,
    pub view_count: i64,
    pub viewed_by: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Data for creating a new report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub owner_id: String,
    pub category: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub photos: Vec<String>,
    pub is_emergency: bool,
    pub priority: ReportPriority,
    pub initial_entry: StatusHistoryEntry,
}

/// Status transition to apply atomically
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ReportStatus,
    pub entry: StatusHistoryEntry,
    /// Only applied when the report has no resolution timestamp yet
    pub resolved_at: Option<DateTime<Utc>>,
    pub after_photos: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Escalation {
    pub level: i16,
    pub reason: String,
    pub escalated_at: DateTime<Utc>,
    pub entry: StatusHistoryEntry,
}

#[derive(Debug, Clone)]
pub struct DeEscalation {
    pub entry: StatusHistoryEntry,
}

/// Result of a like or dislike toggle, as seen by the toggling user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LikeToggle {
    pub owner_id: String,
    pub likes: i64,
    pub dislikes: i64,
    pub liked: bool,
    pub disliked: bool,
    /// Whether the user was in `likes` before the toggle
    pub was_liked: bool,
}

impl LikeToggle {
    /// Change to apply to the owner's `total_likes_received`.
    pub fn likes_received_delta(&self) -> i32 {
        i32::from(self.liked) - i32::from(self.was_liked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct FalseReportToggle {
    pub false_reports: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOutcome {
    pub view_count: i64,
    pub is_new_view: bool,
}

/// Escalation level derived from how long a report has been open.
pub fn escalation_level(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i16 {
    let age = now - created_at;
    if age < Duration::days(ESCALATION_LEVEL_1_AFTER_DAYS) {
        0
    } else if age <= Duration::days(ESCALATION_LEVEL_2_AFTER_DAYS) {
        1
    } else {
        2
    }
}

/// Emergencies are always critical; otherwise the requested priority or medium.
pub fn initial_priority(is_emergency: bool, requested: Option<ReportPriority>) -> ReportPriority {
    if is_emergency {
        ReportPriority::Critical
    } else {
        requested.unwrap_or(ReportPriority::Medium)
    }
}

pub fn status_change_note(from: ReportStatus, to: ReportStatus) -> String {
    format!("Status changed from {} to {}", from, to)
}
