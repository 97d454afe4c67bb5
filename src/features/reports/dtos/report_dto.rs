use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    BoundingBox, FalseReportToggle, LikeToggle, Report, ReportFilter, ReportPriority,
    ReportSortBy, ReportStatus, SortOrder, StatusHistoryEntry, ViewOutcome,
};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::{normalize_category, validate_photo_urls};

/// Largest accepted search radius in kilometres
const MAX_RADIUS_KM: f64 = 500.0;

/// Request DTO for submitting a report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 1, max = 64, message = "Category is required (max 64 characters)"))]
    pub category: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(
        required(message = "lat is required"),
        range(min = -90.0, max = 90.0, message = "lat must be between -90 and 90")
    )]
    pub lat: Option<f64>,

    #[validate(
        required(message = "lng is required"),
        range(min = -180.0, max = 180.0, message = "lng must be between -180 and 180")
    )]
    pub lng: Option<f64>,

    /// Photo URLs from media ingestion
    #[serde(default)]
    #[validate(custom(function = "validate_photo_urls"))]
    pub photos: Vec<String>,

    #[serde(default)]
    pub is_emergency: bool,

    /// Ignored for emergencies, which are always critical
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<ReportPriority>,
}

/// Request DTO for a status transition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,

    #[validate(length(max = 500, message = "Note must not exceed 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Replaces the report's after photos when resolving
    #[validate(custom(function = "validate_photo_urls"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_photos: Option<Vec<String>>,
}

/// Optional body for escalation and de-escalation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct EscalationRequestDto {
    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Query parameters for listing reports
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ReportListQueryDto {
    /// Case-insensitive match on description or category
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<ReportStatus>,
    pub priority: Option<ReportPriority>,
    pub is_emergency: Option<bool>,
    /// Centre latitude of the search area
    pub lat: Option<f64>,
    /// Centre longitude of the search area
    pub lng: Option<f64>,
    /// Search radius in kilometres
    pub radius: Option<f64>,
    pub sort_by: Option<ReportSortBy>,
    pub sort_order: Option<SortOrder>,
    /// Page number (1-indexed, default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 20, max: 100)
    pub limit: Option<i64>,
}

impl ReportListQueryDto {
    pub fn into_filter(self) -> Result<ReportFilter> {
        let bounds = match (self.lat, self.lng, self.radius) {
            (None, None, None) => None,
            (Some(lat), Some(lng), Some(radius)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                    return Err(AppError::BadRequest(
                        "lat/lng out of range".to_string(),
                    ));
                }
                if !(radius > 0.0 && radius <= MAX_RADIUS_KM) {
                    return Err(AppError::BadRequest(format!(
                        "radius must be between 0 and {} km",
                        MAX_RADIUS_KM
                    )));
                }
                Some(BoundingBox::around(lat, lng, radius))
            }
            _ => {
                return Err(AppError::BadRequest(
                    "lat, lng and radius must be given together".to_string(),
                ))
            }
        };

        let defaults = PaginationQuery::default();
        Ok(ReportFilter {
            search: self.search,
            category: self.category.as_deref().map(normalize_category),
            status: self.status,
            priority: self.priority,
            is_emergency: self.is_emergency,
            bounds,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
            pagination: PaginationQuery::new(
                self.page.unwrap_or(defaults.page),
                self.limit.unwrap_or(defaults.limit),
            ),
        })
    }
}

/// How the requesting user has engaged with a report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViewerEngagementDto {
    pub liked: bool,
    pub disliked: bool,
    pub reported_false: bool,
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub owner_id: String,
    pub category: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub photos: Vec<String>,
    pub after_photos: Vec<String>,
    pub status: ReportStatus,
    pub status_history: Vec<StatusHistoryEntry>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub is_emergency: bool,
    pub priority: ReportPriority,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_level: i16,
    pub escalation_reason: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub false_reports: i64,
    pub view_count: i64,
    /// Present when the request is authenticated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ViewerEngagementDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportResponseDto {
    pub fn for_viewer(r: Report, viewer: Option<&str>) -> Self {
        let viewer = viewer.map(|v| ViewerEngagementDto {
            liked: r.likes.iter().any(|u| u == v),
            disliked: r.dislikes.iter().any(|u| u == v),
            reported_false: r.false_reports.iter().any(|u| u == v),
        });

        Self {
            id: r.id,
            owner_id: r.owner_id,
            category: r.category,
            description: r.description,
            lat: r.lat,
            lng: r.lng,
            photos: r.photos,
            after_photos: r.after_photos,
            status: r.status,
            status_history: r.status_history.0,
            resolved_at: r.resolved_at,
            is_emergency: r.is_emergency,
            priority: r.priority,
            escalated_at: r.escalated_at,
            escalation_level: r.escalation_level,
            escalation_reason: r.escalation_reason,
            likes: r.likes.len() as i64,
            dislikes: r.dislikes.len() as i64,
            false_reports: r.false_reports.len() as i64,
            view_count: r.view_count,
            viewer,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self::for_viewer(r, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EngagementCountsDto {
    pub likes: i64,
    pub dislikes: i64,
}

impl From<LikeToggle> for EngagementCountsDto {
    fn from(t: LikeToggle) -> Self {
        Self {
            likes: t.likes,
            dislikes: t.dislikes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FalseReportCountDto {
    pub false_reports: i64,
}

impl From<FalseReportToggle> for FalseReportCountDto {
    fn from(t: FalseReportToggle) -> Self {
        Self {
            false_reports: t.false_reports,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViewResponseDto {
    pub view_count: i64,
    pub is_new_view: bool,
}

impl From<ViewOutcome> for ViewResponseDto {
    fn from(v: ViewOutcome) -> Self {
        Self {
            view_count: v.view_count,
            is_new_view: v.is_new_view,
        }
    }
}
