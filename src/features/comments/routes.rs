use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Comment routes (require auth middleware to be applied by caller)
pub fn protected_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route("/api/reports/{id}/comments", post(handlers::add_comment))
        .route("/api/comments/{id}", delete(handlers::delete_comment))
        .with_state(service)
}

pub fn public_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route("/api/reports/{id}/comments", get(handlers::list_comments))
        .with_state(service)
}
