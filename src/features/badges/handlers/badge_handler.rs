use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::badges::dtos::BadgeDto;
use crate::features::badges::BadgeCatalog;
use crate::shared::types::{ApiResponse, Meta};

/// List every badge that can be earned (public)
#[utoipa::path(
    get,
    path = "/api/badges",
    responses(
        (status = 200, description = "Badge catalog", body = ApiResponse<Vec<BadgeDto>>)
    ),
    tag = "badges"
)]
pub async fn list_badges(
    State(catalog): State<Arc<BadgeCatalog>>,
) -> Result<Json<ApiResponse<Vec<BadgeDto>>>> {
    let badges: Vec<BadgeDto> = catalog.iter().map(BadgeDto::from).collect();
    let total = badges.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(badges),
        None,
        Some(Meta::total(total)),
    )))
}
