use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};

/// Report routes that require auth middleware to be applied by caller
pub fn protected_routes(state: ReportState) -> Router {
    Router::new()
        .route("/api/reports", post(handlers::create_report))
        .route("/api/reports/{id}/status", patch(handlers::update_status))
        .route("/api/reports/{id}/escalate", post(handlers::escalate))
        .route("/api/reports/{id}/de-escalate", post(handlers::de_escalate))
        .route("/api/reports/{id}/like", post(handlers::toggle_like))
        .route("/api/reports/{id}/dislike", post(handlers::toggle_dislike))
        .route(
            "/api/reports/{id}/report-false",
            post(handlers::toggle_false_report),
        )
        .with_state(state)
}

/// Report routes open to anonymous callers. Apply optional auth so signed-in
/// viewers get their engagement flags and deduplicated views.
pub fn public_routes(state: ReportState) -> Router {
    Router::new()
        .route("/api/reports", get(handlers::list_reports))
        .route("/api/reports/{id}", get(handlers::get_report))
        .route("/api/reports/{id}/view", post(handlers::record_view))
        .with_state(state)
}
