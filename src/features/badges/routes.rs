use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::badges::handlers;
use crate::features::badges::BadgeCatalog;

/// Public badge catalog routes
pub fn routes(catalog: Arc<BadgeCatalog>) -> Router {
    Router::new()
        .route("/api/badges", get(handlers::list_badges))
        .with_state(catalog)
}
