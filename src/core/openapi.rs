use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::badges::{dtos as badges_dtos, handlers as badges_handlers};
use crate::features::comments::{dtos as comments_dtos, handlers as comments_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{dtos as users_dtos, handlers::profile_handler, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::record_view,
        reports_handlers::update_status,
        reports_handlers::escalate,
        reports_handlers::de_escalate,
        reports_handlers::toggle_like,
        reports_handlers::toggle_dislike,
        reports_handlers::toggle_false_report,
        // Comments
        comments_handlers::add_comment,
        comments_handlers::list_comments,
        comments_handlers::delete_comment,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::mark_read,
        notifications_handlers::mark_all_read,
        notifications_handlers::delete_notification,
        // Profile
        profile_handler::get_profile,
        profile_handler::my_reports,
        profile_handler::delete_report,
        profile_handler::update_language,
        profile_handler::update_notification_settings,
        profile_handler::my_badges,
        profile_handler::user_badges,
        // Badges (public)
        badges_handlers::list_badges,
    ),
    components(
        schemas(
            Meta,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportPriority,
            reports_models::StatusHistoryEntry,
            reports_models::ReportSortBy,
            reports_models::SortOrder,
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::EscalationRequestDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::ViewerEngagementDto,
            reports_dtos::EngagementCountsDto,
            reports_dtos::FalseReportCountDto,
            reports_dtos::ViewResponseDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::EngagementCountsDto>,
            ApiResponse<reports_dtos::FalseReportCountDto>,
            ApiResponse<reports_dtos::ViewResponseDto>,
            // Comments
            comments_dtos::CreateCommentDto,
            comments_dtos::CommentResponseDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            // Notifications
            notifications_models::NotificationType,
            notifications_models::NotificationData,
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::NotificationListDto,
            notifications_dtos::MarkAllReadResponseDto,
            ApiResponse<notifications_dtos::NotificationListDto>,
            ApiResponse<notifications_dtos::NotificationResponseDto>,
            ApiResponse<notifications_dtos::MarkAllReadResponseDto>,
            // Profile
            users_models::NotificationSettings,
            users_dtos::ProfileResponseDto,
            users_dtos::UserStatsDto,
            users_dtos::UpdateLanguageDto,
            users_dtos::UpdateNotificationSettingsDto,
            users_dtos::UserBadgesDto,
            ApiResponse<users_dtos::ProfileResponseDto>,
            ApiResponse<users_dtos::UserBadgesDto>,
            // Badges
            badges_dtos::BadgeDto,
            ApiResponse<Vec<badges_dtos::BadgeDto>>,
        )
    ),
    tags(
        (name = "reports", description = "Civic issue reports, escalation and engagement"),
        (name = "comments", description = "Comments on reports"),
        (name = "notifications", description = "In-app notifications for the current user"),
        (name = "profile", description = "Citizen profile, preferences and badges"),
        (name = "badges", description = "Badge catalog (public)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CivicWorks API",
        version = "0.1.0",
        description = "API documentation for CivicWorks",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
