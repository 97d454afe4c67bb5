use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, MaybeUser, OptionalJson};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    CreateReportDto, EngagementCountsDto, EscalationRequestDto, FalseReportCountDto,
    ReportListQueryDto, ReportResponseDto, UpdateReportStatusDto, ViewResponseDto,
};
use crate::features::reports::services::{EngagementService, LifecycleService};
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub lifecycle: Arc<LifecycleService>,
    pub engagement: Arc<EngagementService>,
}

fn viewer_id(viewer: &MaybeUser) -> Option<&str> {
    viewer.0.as_ref().map(AuthenticatedUser::user_id)
}

/// Escalation reason from an optional body
fn escalation_reason(body: Option<EscalationRequestDto>) -> Result<Option<String>> {
    let Some(body) = body else {
        return Ok(None);
    };
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(body.reason)
}

/// Submit a new report
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let report = state.lifecycle.create_report(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(ReportResponseDto::for_viewer(report, Some(user.user_id()))),
            Some("Report submitted".to_string()),
            None,
        )),
    ))
}

/// Search and filter reports
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportListQueryDto),
    responses(
        (status = 200, description = "Matching reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Invalid filter")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    viewer: MaybeUser,
    State(state): State<ReportState>,
    Query(query): Query<ReportListQueryDto>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let filter = query.into_filter()?;
    let (reports, total) = state.lifecycle.list_reports(&filter).await?;
    let viewer = viewer_id(&viewer);
    let dtos = reports
        .into_iter()
        .map(|r| ReportResponseDto::for_viewer(r, viewer))
        .collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::paginated(total, &filter.pagination)),
    )))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    viewer: MaybeUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.lifecycle.get_report(id).await?;
    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::for_viewer(report, viewer_id(&viewer))),
        None,
        None,
    )))
}

/// Count a view. Signed-in viewers are counted once.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/view",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "View recorded", body = ApiResponse<ViewResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn record_view(
    viewer: MaybeUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ViewResponseDto>>> {
    let outcome = state.engagement.record_view(id, viewer_id(&viewer)).await?;
    Ok(Json(ApiResponse::success(Some(outcome.into()), None, None)))
}

/// Change a report's status
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_status(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let report = state.lifecycle.update_status(id, user.user_id(), dto).await?;
    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::for_viewer(report, Some(user.user_id()))),
        Some("Report status updated".to_string()),
        None,
    )))
}

/// Flag a report as an emergency
#[utoipa::path(
    post,
    path = "/api/reports/{id}/escalate",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body(content = EscalationRequestDto, description = "Optional reason"),
    responses(
        (status = 200, description = "Report escalated", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn escalate(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    OptionalJson(body): OptionalJson<EscalationRequestDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let reason = escalation_reason(body)?;
    let report = state.lifecycle.escalate(id, user.user_id(), reason).await?;
    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::for_viewer(report, Some(user.user_id()))),
        Some("Report escalated".to_string()),
        None,
    )))
}

/// Remove emergency status
#[utoipa::path(
    post,
    path = "/api/reports/{id}/de-escalate",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body(content = EscalationRequestDto, description = "Optional reason"),
    responses(
        (status = 200, description = "Report de-escalated", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn de_escalate(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    OptionalJson(body): OptionalJson<EscalationRequestDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let reason = escalation_reason(body)?;
    let report = state
        .lifecycle
        .de_escalate(id, user.user_id(), reason)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::for_viewer(report, Some(user.user_id()))),
        Some("Emergency status removed".to_string()),
        None,
    )))
}

/// Toggle a like. Removes an existing dislike.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/like",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Current counts", body = ApiResponse<EngagementCountsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn toggle_like(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EngagementCountsDto>>> {
    let toggle = state.engagement.toggle_like(id, user.user_id()).await?;
    Ok(Json(ApiResponse::success(Some(toggle.into()), None, None)))
}

/// Toggle a dislike. Removes an existing like.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/dislike",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Current counts", body = ApiResponse<EngagementCountsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn toggle_dislike(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EngagementCountsDto>>> {
    let toggle = state.engagement.toggle_dislike(id, user.user_id()).await?;
    Ok(Json(ApiResponse::success(Some(toggle.into()), None, None)))
}

/// Toggle a false-report flag
#[utoipa::path(
    post,
    path = "/api/reports/{id}/report-false",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Current flag count", body = ApiResponse<FalseReportCountDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn toggle_false_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FalseReportCountDto>>> {
    let toggle = state
        .engagement
        .toggle_false_report(id, user.user_id())
        .await?;
    Ok(Json(ApiResponse::success(Some(toggle.into()), None, None)))
}
