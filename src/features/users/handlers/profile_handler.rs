use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::users::dtos::{
    ProfileResponseDto, UpdateLanguageDto, UpdateNotificationSettingsDto, UserBadgesDto,
};
use crate::features::users::services::ProfileService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    let profile = service.get_profile(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile.into()), None, None)))
}

/// Reports submitted by the current user, newest first
#[utoipa::path(
    get,
    path = "/api/profile/my-reports",
    responses(
        (status = 200, description = "User's reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_reports(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.my_reports(user.user_id()).await?;
    let total = reports.len() as i64;
    let dtos = reports
        .into_iter()
        .map(|r| ReportResponseDto::for_viewer(r, Some(user.user_id())))
        .collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/profile/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Report not found")
    ),
    tag = "profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_report(user.user_id(), id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Report deleted".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/profile/language",
    request_body = UpdateLanguageDto,
    responses(
        (status = 200, description = "Language updated", body = ApiResponse<ProfileResponseDto>),
        (status = 400, description = "Unsupported language"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_language(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<UpdateLanguageDto>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = service.update_language(&user, &dto.language).await?;
    Ok(Json(ApiResponse::success(
        Some(profile.into()),
        Some("Language updated".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/profile/notification-settings",
    request_body = UpdateNotificationSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<ProfileResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_notification_settings(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<UpdateNotificationSettingsDto>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    let profile = service
        .update_notification_settings(&user, dto.into())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(profile.into()),
        Some("Notification settings updated".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/profile/badges",
    responses(
        (status = 200, description = "Badges earned by the current user", body = ApiResponse<UserBadgesDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_badges(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<UserBadgesDto>>> {
    let (profile, badges) = service.my_badges(&user).await?;
    Ok(Json(ApiResponse::success(
        Some(UserBadgesDto::new(profile, badges)),
        None,
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/profile/{user_id}/badges",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Badges earned by the user", body = ApiResponse<UserBadgesDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn user_badges(
    _user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserBadgesDto>>> {
    let (profile, badges) = service.badges_of(&user_id).await?;
    Ok(Json(ApiResponse::success(
        Some(UserBadgesDto::new(profile, badges)),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use super::*;
    use crate::features::users::routes;
    use crate::shared::test_helpers::{test_user, with_auth, TestContext};

    fn server(ctx: &TestContext, user: &AuthenticatedUser) -> TestServer {
        let router = routes::protected_routes(Arc::new(ctx.profile()));
        TestServer::new(with_auth(router, user.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_profile_reports_stats_after_first_report() {
        let ctx = TestContext::new();
        let user = test_user();
        ctx.create_road_report(&user).await;

        let body: ApiResponse<ProfileResponseDto> = server(&ctx, &user)
            .get("/api/profile")
            .await
            .json();
        let profile = body.data.unwrap();
        assert_eq!(profile.points, 60);
        assert_eq!(profile.stats.total_reports, 1);
        assert_eq!(profile.badges, vec!["first_report"]);
    }

    #[tokio::test]
    async fn test_unsupported_language_is_rejected() {
        let ctx = TestContext::new();
        let server = server(&ctx, &test_user());

        server
            .patch("/api/profile/language")
            .json(&json!({ "language": "xx" }))
            .await
            .assert_status_bad_request();

        let body: ApiResponse<ProfileResponseDto> = server
            .patch("/api/profile/language")
            .json(&json!({ "language": "hi" }))
            .await
            .json();
        assert_eq!(body.data.unwrap().language, "hi");
    }

    #[tokio::test]
    async fn test_delete_other_users_report_is_forbidden() {
        let ctx = TestContext::new();
        let report = ctx.create_road_report(&test_user()).await;

        server(&ctx, &test_user())
            .delete(&format!("/api/profile/reports/{}", report.id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_badges_of_other_user() {
        let ctx = TestContext::new();
        let reporter = test_user();
        ctx.create_road_report(&reporter).await;
        let server = server(&ctx, &test_user());

        let body: ApiResponse<UserBadgesDto> = server
            .get(&format!("/api/profile/{}/badges", reporter.sub))
            .await
            .json();
        let badges = body.data.unwrap();
        assert_eq!(badges.badges.len(), 1);
        assert_eq!(badges.badges[0].id, "first_report");

        server
            .get("/api/profile/nobody/badges")
            .await
            .assert_status_not_found();
    }
}
