#![cfg(test)]

use std::sync::Arc;

use axum::{Extension, Router};
use chrono::Utc;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use sqlx::types::Json;
use uuid::Uuid;

use crate::core::events::EventBus;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::badges::{BadgeCatalog, BadgeListener, BadgeRuleEngine};
use crate::features::comments::services::CommentService;
use crate::features::comments::store::memory::InMemoryCommentStore;
use crate::features::notifications::services::{
    NotificationDispatcher, NotificationListener, NotificationService,
};
use crate::features::notifications::store::memory::InMemoryNotificationStore;
use crate::features::reports::dtos::CreateReportDto;
use crate::features::reports::models::{
    Report, ReportPriority, ReportStatus, StatusHistoryEntry,
};
use crate::features::reports::services::{EngagementService, LifecycleService};
use crate::features::reports::store::memory::InMemoryReportStore;
use crate::features::users::models::User;
use crate::features::users::services::ProfileService;
use crate::features::users::store::memory::InMemoryUserStore;
use crate::features::users::store::UserStore;

/// A citizen with a unique id and a fake name and email
pub fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: Uuid::now_v7().to_string(),
        name: Some(Name().fake()),
        email: Some(SafeEmail().fake()),
        roles: vec![],
    }
}

/// Attach `user` to every request, standing in for the JWT middleware
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(Extension(user))
}

pub fn create_report_dto(category: &str) -> CreateReportDto {
    CreateReportDto {
        category: category.to_string(),
        description: Some("Deep pothole near the bus stop".to_string()),
        lat: Some(28.61),
        lng: Some(77.20),
        photos: vec!["https://cdn.civicworks.in/p/pothole.jpg".to_string()],
        is_emergency: false,
        priority: None,
    }
}

/// A pending road report that has not been through any service
pub fn report_fixture(owner_id: &str) -> Report {
    let now = Utc::now();
    Report {
        id: Uuid::now_v7(),
        owner_id: owner_id.to_string(),
        category: "road".to_string(),
        description: Some("Deep pothole near the bus stop".to_string()),
        lat: 28.61,
        lng: 77.20,
        photos: vec![],
        after_photos: vec![],
        status: ReportStatus::Pending,
        status_history: Json(vec![StatusHistoryEntry::new(
            ReportStatus::Pending,
            owner_id,
            "Report created",
        )]),
        resolved_at: None,
        is_emergency: false,
        priority: ReportPriority::Medium,
        escalated_at: None,
        escalation_level: 0,
        escalation_reason: None,
        likes: vec![],
        dislikes: vec![],
        false_reports: vec![],
        view_count: 0,
        viewed_by: vec![],
        created_at: now,
        updated_at: now,
    }
}

/// In-memory stores wired to the same listeners as production
pub struct TestContext {
    pub reports: Arc<InMemoryReportStore>,
    pub users: Arc<InMemoryUserStore>,
    pub comments: Arc<InMemoryCommentStore>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub catalog: Arc<BadgeCatalog>,
    pub events: EventBus,
}

impl TestContext {
    pub fn new() -> Self {
        let reports = Arc::new(InMemoryReportStore::new());
        let users = Arc::new(InMemoryUserStore::new());
        let comments = Arc::new(InMemoryCommentStore::new(users.clone()));
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let catalog = Arc::new(BadgeCatalog::standard());

        let dispatcher = Arc::new(NotificationDispatcher::new(notifications.clone()));
        let engine = Arc::new(BadgeRuleEngine::new(
            users.clone(),
            catalog.clone(),
            dispatcher.clone(),
        ));
        let events = EventBus::new()
            .with_listener(Arc::new(BadgeListener::new(engine)))
            .with_listener(Arc::new(NotificationListener::new(dispatcher)));

        Self {
            reports,
            users,
            comments,
            notifications,
            catalog,
            events,
        }
    }

    pub fn lifecycle(&self) -> LifecycleService {
        LifecycleService::new(self.reports.clone(), self.users.clone(), self.events.clone())
    }

    pub fn engagement(&self) -> EngagementService {
        EngagementService::new(self.reports.clone(), self.users.clone(), self.events.clone())
    }

    pub fn comments_service(&self) -> CommentService {
        CommentService::new(
            self.comments.clone(),
            self.reports.clone(),
            self.users.clone(),
            self.events.clone(),
        )
    }

    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.users.clone(), self.reports.clone(), self.catalog.clone())
    }

    pub fn notification_service(&self) -> NotificationService {
        NotificationService::new(self.notifications.clone())
    }

    pub async fn create_road_report(&self, owner: &AuthenticatedUser) -> Report {
        self.lifecycle()
            .create_report(owner, create_report_dto("road"))
            .await
            .unwrap()
    }

    pub async fn user(&self, id: &str) -> User {
        self.users.find_by_id(id).await.unwrap().unwrap()
    }
}
