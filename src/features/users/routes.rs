use crate::features::users::handlers::profile_handler;
use crate::features::users::services::ProfileService;
use axum::{
    routing::{delete, get, patch},
    Router,
};
use std::sync::Arc;

/// Profile routes (require auth middleware to be applied by caller)
pub fn protected_routes(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route("/api/profile", get(profile_handler::get_profile))
        .route("/api/profile/my-reports", get(profile_handler::my_reports))
        .route(
            "/api/profile/reports/{id}",
            delete(profile_handler::delete_report),
        )
        .route(
            "/api/profile/language",
            patch(profile_handler::update_language),
        )
        .route(
            "/api/profile/notification-settings",
            patch(profile_handler::update_notification_settings),
        )
        .route("/api/profile/badges", get(profile_handler::my_badges))
        .route(
            "/api/profile/{user_id}/badges",
            get(profile_handler::user_badges),
        )
        .with_state(service)
}
