use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::events::{DomainEvent, EventBus};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{CreateReportDto, UpdateReportStatusDto};
use crate::features::reports::models::{
    escalation_level, initial_priority, status_change_note, DeEscalation, Escalation, NewReport,
    Report, ReportFilter, ReportStatus, StatusChange, StatusHistoryEntry,
};
use crate::features::reports::store::ReportStore;
use crate::features::users::models::UserIdentity;
use crate::features::users::store::UserStore;
use crate::shared::constants::{
    DEFAULT_DE_ESCALATION_REASON, DEFAULT_ESCALATION_REASON, EMERGENCY_REPORT_POINTS,
    NOTE_REPORT_CREATED, REPORT_POINTS,
};
use crate::shared::validation::{normalize_category, CATEGORY_REGEX};

/// Trimmed text, or `None` when blank
fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Service for report creation, status transitions and escalation
pub struct LifecycleService {
    reports: Arc<dyn ReportStore>,
    users: Arc<dyn UserStore>,
    events: EventBus,
}

impl LifecycleService {
    pub fn new(reports: Arc<dyn ReportStore>, users: Arc<dyn UserStore>, events: EventBus) -> Self {
        Self {
            reports,
            users,
            events,
        }
    }

    /// Submit a new report in `pending` and credit the owner
    pub async fn create_report(
        &self,
        owner: &AuthenticatedUser,
        dto: CreateReportDto,
    ) -> Result<Report> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let category = normalize_category(&dto.category);
        if category.is_empty() {
            return Err(AppError::Validation("Category is required".to_string()));
        }
        if !CATEGORY_REGEX.is_match(&category) {
            return Err(AppError::Validation(format!(
                "Invalid category '{}': use letters, digits, '_' or '-'",
                dto.category
            )));
        }
        let (Some(lat), Some(lng)) = (dto.lat, dto.lng) else {
            return Err(AppError::Validation("lat and lng are required".to_string()));
        };

        self.users.ensure(&UserIdentity::from(owner)).await?;

        let report = self
            .reports
            .insert(NewReport {
                owner_id: owner.user_id().to_string(),
                category,
                description: non_blank(dto.description),
                lat,
                lng,
                photos: dto.photos,
                is_emergency: dto.is_emergency,
                priority: initial_priority(dto.is_emergency, dto.priority),
                initial_entry: StatusHistoryEntry::new(
                    ReportStatus::Pending,
                    owner.user_id(),
                    NOTE_REPORT_CREATED,
                ),
            })
            .await?;

        let points = if report.is_emergency {
            EMERGENCY_REPORT_POINTS
        } else {
            REPORT_POINTS
        };
        self.users
            .record_report(&report.owner_id, report.is_emergency, points)
            .await?;

        tracing::info!(
            "Created report {} ({}, priority {}) for user {}",
            report.id,
            report.category,
            report.priority,
            report.owner_id
        );

        self.events
            .publish(DomainEvent::ReportCreated {
                report: report.clone(),
            })
            .await;

        Ok(report)
    }

    pub async fn get_report(&self, id: Uuid) -> Result<Report> {
        self.reports
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    pub async fn list_reports(&self, filter: &ReportFilter) -> Result<(Vec<Report>, i64)> {
        self.reports.list(filter).await
    }

    /// Move a report to any status, appending to its history
    pub async fn update_status(
        &self,
        id: Uuid,
        actor: &str,
        dto: UpdateReportStatusDto,
    ) -> Result<Report> {
        let current = self.get_report(id).await?;
        let from = current.status;

        let note = non_blank(dto.note).unwrap_or_else(|| status_change_note(from, dto.status));
        let resolving = dto.status == ReportStatus::Resolved;

        let change = StatusChange {
            status: dto.status,
            entry: StatusHistoryEntry::new(dto.status, actor, note),
            resolved_at: resolving.then(Utc::now),
            after_photos: if resolving { dto.after_photos } else { None },
        };

        let report = self
            .reports
            .apply_status_change(id, change)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!(
            "Report {} status changed from {} to {} by {}",
            id,
            from,
            report.status,
            actor
        );

        self.events
            .publish(DomainEvent::StatusChanged {
                report: report.clone(),
                from,
                actor: actor.to_string(),
            })
            .await;

        Ok(report)
    }

    /// Mark a report as an emergency. The level grows with the report's age.
    pub async fn escalate(&self, id: Uuid, actor: &str, reason: Option<String>) -> Result<Report> {
        let current = self.get_report(id).await?;
        let now = Utc::now();
        let level = escalation_level(current.created_at, now);
        let reason = non_blank(reason).unwrap_or_else(|| DEFAULT_ESCALATION_REASON.to_string());

        let escalation = Escalation {
            level,
            entry: StatusHistoryEntry::new(
                current.status,
                actor,
                format!("Escalated to level {}: {}", level, reason),
            ),
            reason,
            escalated_at: now,
        };

        let report = self
            .reports
            .apply_escalation(id, escalation)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!("Report {} escalated to level {} by {}", id, level, actor);

        self.events
            .publish(DomainEvent::ReportEscalated {
                report: report.clone(),
                actor: actor.to_string(),
            })
            .await;

        Ok(report)
    }

    /// Clear emergency status and reset priority to medium
    pub async fn de_escalate(
        &self,
        id: Uuid,
        actor: &str,
        reason: Option<String>,
    ) -> Result<Report> {
        let current = self.get_report(id).await?;
        let note = non_blank(reason).unwrap_or_else(|| DEFAULT_DE_ESCALATION_REASON.to_string());

        let report = self
            .reports
            .apply_de_escalation(
                id,
                DeEscalation {
                    entry: StatusHistoryEntry::new(current.status, actor, note),
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!("Report {} de-escalated by {}", id, actor);

        self.events
            .publish(DomainEvent::ReportDeEscalated {
                report: report.clone(),
                actor: actor.to_string(),
            })
            .await;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::features::notifications::models::NotificationType;
    use crate::features::reports::models::ReportPriority;
    use crate::shared::test_helpers::{create_report_dto, test_user, TestContext};

    #[tokio::test]
    async fn test_create_road_report_awards_points_and_first_badge() {
        let ctx = TestContext::new();
        let owner = test_user();

        let report = ctx
            .lifecycle()
            .create_report(&owner, create_report_dto("road"))
            .await
            .unwrap();

        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.priority, ReportPriority::Medium);
        assert!(!report.is_emergency);
        assert_eq!(report.status_history.0.len(), 1);
        assert_eq!(
            report.status_history.0[0].note.as_deref(),
            Some(NOTE_REPORT_CREATED)
        );
        assert_eq!(report.status_history.0[0].changed_by, owner.sub);

        let user = ctx.user(&owner.sub).await;
        assert_eq!(user.total_reports, 1);
        assert_eq!(user.emergency_reports, 0);
        assert_eq!(user.badges, vec!["first_report"]);
        assert_eq!(user.points, REPORT_POINTS + 50);

        let sent = ctx.notifications.all_for(&owner.sub);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].notification_type, NotificationType::BadgeEarned);
    }

    #[tokio::test]
    async fn test_report_lands_when_notification_writes_fail() {
        let ctx = TestContext::new();
        ctx.notifications.fail_writes();
        let owner = test_user();

        let report = ctx
            .lifecycle()
            .create_report(&owner, create_report_dto("road"))
            .await
            .unwrap();

        let stored = ctx.lifecycle().get_report(report.id).await.unwrap();
        assert_eq!(stored.owner_id, owner.sub);

        let user = ctx.user(&owner.sub).await;
        assert_eq!(user.total_reports, 1);
        assert_eq!(user.badges, vec!["first_report"]);
        assert_eq!(user.points, REPORT_POINTS + 50);
        assert!(ctx.notifications.all_for(&owner.sub).is_empty());
    }

    #[tokio::test]
    async fn test_second_report_earns_no_new_badge() {
        let ctx = TestContext::new();
        let owner = test_user();
        ctx.create_road_report(&owner).await;
        ctx.create_road_report(&owner).await;

        let user = ctx.user(&owner.sub).await;
        assert_eq!(user.total_reports, 2);
        assert_eq!(user.points, 2 * REPORT_POINTS + 50);
    }

    #[tokio::test]
    async fn test_emergency_report_is_critical() {
        let ctx = TestContext::new();
        let owner = test_user();
        let mut dto = create_report_dto("water-supply");
        dto.is_emergency = true;
        dto.priority = Some(ReportPriority::Low);

        let report = ctx.lifecycle().create_report(&owner, dto).await.unwrap();
        assert_eq!(report.priority, ReportPriority::Critical);

        let user = ctx.user(&owner.sub).await;
        assert_eq!(user.emergency_reports, 1);
        assert_eq!(user.points, EMERGENCY_REPORT_POINTS + 50);
    }

    #[tokio::test]
    async fn test_explicit_priority_without_emergency() {
        let ctx = TestContext::new();
        let mut dto = create_report_dto("Street Light");
        dto.priority = Some(ReportPriority::High);

        let report = ctx
            .lifecycle()
            .create_report(&test_user(), dto)
            .await
            .unwrap();
        assert_eq!(report.priority, ReportPriority::High);
        assert_eq!(report.category, "street_light");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let ctx = TestContext::new();
        let owner = test_user();

        let err = ctx
            .lifecycle()
            .create_report(&owner, create_report_dto("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut dto = create_report_dto("road");
        dto.lng = None;
        let err = ctx.lifecycle().create_report(&owner, dto).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(ctx.users.find_by_id(&owner.sub).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_escalate_with_reason_notifies_owner_once() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        let escalated = ctx
            .lifecycle()
            .escalate(report.id, "officer-7", Some("Safety hazard".to_string()))
            .await
            .unwrap();

        assert!(escalated.is_emergency);
        assert_eq!(escalated.priority, ReportPriority::Critical);
        assert_eq!(escalated.escalation_level, 0);
        assert_eq!(escalated.escalation_reason.as_deref(), Some("Safety hazard"));
        assert!(escalated.escalated_at.is_some());
        assert_eq!(escalated.status, ReportStatus::Pending);
        let last = escalated.status_history.0.last().unwrap();
        assert_eq!(last.status, ReportStatus::Pending);
        assert_eq!(last.changed_by, "officer-7");

        let escalations: Vec<_> = ctx
            .notifications
            .all_for(&owner.sub)
            .into_iter()
            .filter(|n| n.notification_type == NotificationType::Escalation)
            .collect();
        assert_eq!(escalations.len(), 1);
        assert_eq!(escalations[0].data.0.report_id, Some(report.id));
    }

    #[tokio::test]
    async fn test_escalation_level_follows_report_age() {
        let ctx = TestContext::new();
        let owner = test_user();

        for (days, expected) in [(1, 0), (10, 1), (20, 2)] {
            let report = ctx.create_road_report(&owner).await;
            ctx.reports
                .backdate(report.id, Utc::now() - Duration::days(days));

            let escalated = ctx
                .lifecycle()
                .escalate(report.id, &owner.sub, None)
                .await
                .unwrap();
            assert_eq!(escalated.escalation_level, expected, "age {} days", days);
            assert_eq!(
                escalated.escalation_reason.as_deref(),
                Some(DEFAULT_ESCALATION_REASON)
            );
        }
    }

    #[tokio::test]
    async fn test_de_escalate_always_resets_to_medium() {
        let ctx = TestContext::new();
        let owner = test_user();
        let mut dto = create_report_dto("road");
        dto.priority = Some(ReportPriority::High);
        let report = ctx.lifecycle().create_report(&owner, dto).await.unwrap();

        ctx.lifecycle()
            .escalate(report.id, &owner.sub, Some("Flooding".to_string()))
            .await
            .unwrap();
        let calm = ctx
            .lifecycle()
            .de_escalate(report.id, &owner.sub, None)
            .await
            .unwrap();

        assert!(!calm.is_emergency);
        assert_eq!(calm.priority, ReportPriority::Medium);
        assert_eq!(calm.escalation_level, 0);
        assert!(calm.escalation_reason.is_none());
        assert!(calm.escalated_at.is_some());
        assert_eq!(
            calm.status_history.0.last().unwrap().note.as_deref(),
            Some(DEFAULT_DE_ESCALATION_REASON)
        );

        let updates = ctx
            .notifications
            .all_for(&owner.sub)
            .into_iter()
            .filter(|n| n.notification_type == NotificationType::StatusUpdate)
            .count();
        assert_eq!(updates, 1);
    }

    #[tokio::test]
    async fn test_resolving_twice_keeps_first_timestamp() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        let resolve = |photos: Option<Vec<String>>| UpdateReportStatusDto {
            status: ReportStatus::Resolved,
            note: None,
            after_photos: photos,
        };

        let first = ctx
            .lifecycle()
            .update_status(
                report.id,
                "officer-7",
                resolve(Some(vec!["https://cdn.civicworks.in/after.jpg".to_string()])),
            )
            .await
            .unwrap();
        let resolved_at = first.resolved_at.unwrap();
        assert_eq!(first.after_photos.len(), 1);
        assert_eq!(
            first.status_history.0.last().unwrap().note.as_deref(),
            Some("Status changed from pending to resolved")
        );

        ctx.lifecycle()
            .update_status(
                report.id,
                "officer-7",
                UpdateReportStatusDto {
                    status: ReportStatus::InProgress,
                    note: Some("Reopened".to_string()),
                    after_photos: None,
                },
            )
            .await
            .unwrap();
        let again = ctx
            .lifecycle()
            .update_status(report.id, "officer-7", resolve(None))
            .await
            .unwrap();

        assert_eq!(again.resolved_at, Some(resolved_at));
        assert_eq!(again.after_photos.len(), 1);
        assert_eq!(again.status_history.0.len(), 4);
    }

    #[tokio::test]
    async fn test_status_change_notifies_owner() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        ctx.lifecycle()
            .update_status(
                report.id,
                "officer-7",
                UpdateReportStatusDto {
                    status: ReportStatus::UnderReview,
                    note: None,
                    after_photos: None,
                },
            )
            .await
            .unwrap();

        let updates: Vec<_> = ctx
            .notifications
            .all_for(&owner.sub)
            .into_iter()
            .filter(|n| n.notification_type == NotificationType::StatusUpdate)
            .collect();
        assert_eq!(updates.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_report_is_not_found() {
        let ctx = TestContext::new();
        let id = Uuid::now_v7();

        let err = ctx.lifecycle().escalate(id, "a", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = ctx.lifecycle().de_escalate(id, "a", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = ctx
            .lifecycle()
            .update_status(
                id,
                "a",
                UpdateReportStatusDto {
                    status: ReportStatus::Rejected,
                    note: None,
                    after_photos: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
