use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::{
    MarkAllReadResponseDto, NotificationListDto, NotificationQueryDto, NotificationResponseDto,
};
use crate::features::notifications::services::NotificationService;
use crate::shared::types::ApiResponse;

/// List the current user's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQueryDto),
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<NotificationListDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Query(query): Query<NotificationQueryDto>,
) -> Result<Json<ApiResponse<NotificationListDto>>> {
    let pagination = query.pagination();
    let page = service
        .list(user.user_id(), query.unread_only, &pagination)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(NotificationListDto::from_page(page, &pagination)),
        None,
        None,
    )))
}

/// Mark one notification as read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = ApiResponse<NotificationResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationResponseDto>>> {
    let notification = service.mark_read(user.user_id(), id).await?;
    Ok(Json(ApiResponse::success(
        Some(notification.into()),
        None,
        None,
    )))
}

/// Mark every notification of the current user as read
#[utoipa::path(
    patch,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All notifications marked as read", body = ApiResponse<MarkAllReadResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_all_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<Json<ApiResponse<MarkAllReadResponseDto>>> {
    let updated = service.mark_all_read(user.user_id()).await?;
    Ok(Json(ApiResponse::success(
        Some(MarkAllReadResponseDto { updated }),
        Some("All notifications marked as read".to_string()),
        None,
    )))
}

/// Delete one notification
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn delete_notification(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(user.user_id(), id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Notification deleted".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use super::*;
    use crate::features::notifications::models::{NotificationData, NotificationType};
    use crate::features::notifications::routes;
    use crate::features::notifications::services::NotificationDispatcher;
    use crate::features::notifications::store::memory::InMemoryNotificationStore;
    use crate::shared::test_helpers::{test_user, with_auth};

    async fn server_for(user: &AuthenticatedUser, unread: usize) -> TestServer {
        let store = Arc::new(InMemoryNotificationStore::new());
        let dispatcher = NotificationDispatcher::new(store.clone());
        for i in 0..unread {
            dispatcher
                .notify(
                    user.user_id(),
                    NotificationType::System,
                    format!("Notice {}", i),
                    "body",
                    NotificationData::default(),
                )
                .await;
        }
        let router = routes::protected_routes(Arc::new(NotificationService::new(store)));
        TestServer::new(with_auth(router, user.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_list_reports_unread_and_pages() {
        let user = test_user();
        let server = server_for(&user, 3).await;

        let response = server
            .get("/api/notifications")
            .add_query_param("limit", 2)
            .await;
        response.assert_status_ok();

        let body: ApiResponse<NotificationListDto> = response.json();
        let list = body.data.unwrap();
        assert_eq!(list.notifications.len(), 2);
        assert_eq!(list.total, 3);
        assert_eq!(list.unread_count, 3);
        assert_eq!(list.page, 1);
        assert_eq!(list.pages, 2);
    }

    #[tokio::test]
    async fn test_read_all_then_unread_only_is_empty() {
        let user = test_user();
        let server = server_for(&user, 2).await;

        server
            .patch("/api/notifications/read-all")
            .await
            .assert_status_ok();

        let body: ApiResponse<NotificationListDto> = server
            .get("/api/notifications")
            .add_query_param("unread_only", true)
            .await
            .json();
        let list = body.data.unwrap();
        assert_eq!(list.total, 0);
        assert_eq!(list.unread_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_notification_is_not_found() {
        let user = test_user();
        let server = server_for(&user, 0).await;

        let response = server
            .patch(&format!("/api/notifications/{}/read", Uuid::now_v7()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
