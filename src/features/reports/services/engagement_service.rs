use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::events::{DomainEvent, EventBus};
use crate::features::reports::models::{FalseReportToggle, LikeToggle, ViewOutcome};
use crate::features::reports::store::ReportStore;
use crate::features::users::store::UserStore;

/// Service for likes, dislikes, false-report flags and view counting
pub struct EngagementService {
    reports: Arc<dyn ReportStore>,
    users: Arc<dyn UserStore>,
    events: EventBus,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Report {} not found", id))
}

impl EngagementService {
    pub fn new(reports: Arc<dyn ReportStore>, users: Arc<dyn UserStore>, events: EventBus) -> Self {
        Self {
            reports,
            users,
            events,
        }
    }

    pub async fn toggle_like(&self, report_id: Uuid, user_id: &str) -> Result<LikeToggle> {
        let toggle = self
            .reports
            .toggle_like(report_id, user_id)
            .await?
            .ok_or_else(|| not_found(report_id))?;
        self.settle_likes_received(report_id, user_id, &toggle)
            .await?;
        Ok(toggle)
    }

    pub async fn toggle_dislike(&self, report_id: Uuid, user_id: &str) -> Result<LikeToggle> {
        let toggle = self
            .reports
            .toggle_dislike(report_id, user_id)
            .await?
            .ok_or_else(|| not_found(report_id))?;
        self.settle_likes_received(report_id, user_id, &toggle)
            .await?;
        Ok(toggle)
    }

    pub async fn toggle_false_report(
        &self,
        report_id: Uuid,
        user_id: &str,
    ) -> Result<FalseReportToggle> {
        let toggle = self
            .reports
            .toggle_false_report(report_id, user_id)
            .await?
            .ok_or_else(|| not_found(report_id))?;

        tracing::info!(
            "User {} {} report {} as false ({} flags)",
            user_id,
            if toggle.active { "flagged" } else { "unflagged" },
            report_id,
            toggle.false_reports
        );
        Ok(toggle)
    }

    /// Count a view. Authenticated viewers are counted once per report.
    pub async fn record_view(&self, report_id: Uuid, viewer: Option<&str>) -> Result<ViewOutcome> {
        self.reports
            .record_view(report_id, viewer)
            .await?
            .ok_or_else(|| not_found(report_id))
    }

    /// Keep the owner's `total_likes_received` in step with the toggle
    async fn settle_likes_received(
        &self,
        report_id: Uuid,
        user_id: &str,
        toggle: &LikeToggle,
    ) -> Result<()> {
        let delta = toggle.likes_received_delta();
        if delta == 0 {
            return Ok(());
        }

        self.users
            .adjust_likes_received(&toggle.owner_id, delta)
            .await?;

        self.events
            .publish(DomainEvent::LikeToggled {
                report_id,
                owner_id: toggle.owner_id.clone(),
                user_id: user_id.to_string(),
                liked: delta > 0,
            })
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_user, TestContext};

    #[tokio::test]
    async fn test_like_and_dislike_are_exclusive() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        let liked = ctx.engagement().toggle_like(report.id, "fan").await.unwrap();
        assert_eq!((liked.likes, liked.dislikes), (1, 0));
        assert_eq!(ctx.user(&owner.sub).await.total_likes_received, 1);

        let disliked = ctx
            .engagement()
            .toggle_dislike(report.id, "fan")
            .await
            .unwrap();
        assert_eq!((disliked.likes, disliked.dislikes), (0, 1));
        assert_eq!(ctx.user(&owner.sub).await.total_likes_received, 0);

        let stored = ctx.lifecycle().get_report(report.id).await.unwrap();
        assert!(stored.likes.is_empty());
        assert_eq!(stored.dislikes, vec!["fan"]);
    }

    #[tokio::test]
    async fn test_double_toggle_restores_state() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        ctx.engagement().toggle_like(report.id, "fan").await.unwrap();
        let back = ctx.engagement().toggle_like(report.id, "fan").await.unwrap();
        assert_eq!((back.likes, back.dislikes), (0, 0));
        assert!(!back.liked);
        assert_eq!(ctx.user(&owner.sub).await.total_likes_received, 0);

        ctx.engagement()
            .toggle_dislike(report.id, "critic")
            .await
            .unwrap();
        let back = ctx
            .engagement()
            .toggle_dislike(report.id, "critic")
            .await
            .unwrap();
        assert_eq!((back.likes, back.dislikes), (0, 0));
    }

    #[tokio::test]
    async fn test_self_like_counts() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        ctx.engagement()
            .toggle_like(report.id, &owner.sub)
            .await
            .unwrap();
        assert_eq!(ctx.user(&owner.sub).await.total_likes_received, 1);
    }

    #[tokio::test]
    async fn test_fifty_likes_earn_helpful_badge() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        for i in 0..50 {
            ctx.engagement()
                .toggle_like(report.id, &format!("neighbour-{}", i))
                .await
                .unwrap();
        }

        let user = ctx.user(&owner.sub).await;
        assert_eq!(user.total_likes_received, 50);
        assert_eq!(user.badges, vec!["first_report", "helpful"]);
        assert_eq!(user.points, 10 + 50 + 50);
    }

    #[tokio::test]
    async fn test_false_report_is_independent_of_likes() {
        let ctx = TestContext::new();
        let report = ctx.create_road_report(&test_user()).await;

        ctx.engagement().toggle_like(report.id, "fan").await.unwrap();
        let flagged = ctx
            .engagement()
            .toggle_false_report(report.id, "fan")
            .await
            .unwrap();
        assert_eq!(flagged.false_reports, 1);
        assert!(flagged.active);

        let stored = ctx.lifecycle().get_report(report.id).await.unwrap();
        assert_eq!(stored.likes, vec!["fan"]);

        let cleared = ctx
            .engagement()
            .toggle_false_report(report.id, "fan")
            .await
            .unwrap();
        assert_eq!(cleared.false_reports, 0);
    }

    #[tokio::test]
    async fn test_authenticated_views_count_once() {
        let ctx = TestContext::new();
        let report = ctx.create_road_report(&test_user()).await;

        let first = ctx
            .engagement()
            .record_view(report.id, Some("reader"))
            .await
            .unwrap();
        assert_eq!(first.view_count, 1);
        assert!(first.is_new_view);

        let second = ctx
            .engagement()
            .record_view(report.id, Some("reader"))
            .await
            .unwrap();
        assert_eq!(second.view_count, 1);
        assert!(!second.is_new_view);
    }

    #[tokio::test]
    async fn test_anonymous_views_always_count() {
        let ctx = TestContext::new();
        let report = ctx.create_road_report(&test_user()).await;

        ctx.engagement().record_view(report.id, None).await.unwrap();
        let second = ctx.engagement().record_view(report.id, None).await.unwrap();
        assert_eq!(second.view_count, 2);
        assert!(second.is_new_view);
    }

    #[tokio::test]
    async fn test_engagement_on_missing_report() {
        let ctx = TestContext::new();
        let id = Uuid::now_v7();

        assert!(matches!(
            ctx.engagement().toggle_like(id, "fan").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ctx.engagement().record_view(id, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_engagement_creates_no_notifications() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;
        let before = ctx.notifications.all_for(&owner.sub).len();

        ctx.engagement().toggle_like(report.id, "fan").await.unwrap();
        ctx.engagement()
            .toggle_false_report(report.id, "fan")
            .await
            .unwrap();
        ctx.engagement()
            .record_view(report.id, Some("fan"))
            .await
            .unwrap();

        assert_eq!(ctx.notifications.all_for(&owner.sub).len(), before);
    }
}
