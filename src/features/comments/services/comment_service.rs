use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::events::{DomainEvent, EventBus};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::models::{Comment, NewComment};
use crate::features::comments::store::CommentStore;
use crate::features::reports::store::ReportStore;
use crate::features::users::models::UserIdentity;
use crate::features::users::store::UserStore;
use crate::shared::constants::MAX_COMMENT_LENGTH;

pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    reports: Arc<dyn ReportStore>,
    users: Arc<dyn UserStore>,
    events: EventBus,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        reports: Arc<dyn ReportStore>,
        users: Arc<dyn UserStore>,
        events: EventBus,
    ) -> Self {
        Self {
            comments,
            reports,
            users,
            events,
        }
    }

    /// Comment on a report. Comments from anyone but the owner count toward
    /// the owner's `total_comments_received`.
    pub async fn add_comment(
        &self,
        report_id: Uuid,
        author: &AuthenticatedUser,
        text: &str,
    ) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment text is required".to_string()));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment must not exceed {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let report = self
            .reports
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        self.users.ensure(&UserIdentity::from(author)).await?;

        let comment = self
            .comments
            .insert(NewComment {
                report_id,
                user_id: author.user_id().to_string(),
                text: text.to_string(),
            })
            .await?;

        if !report.is_owned_by(author.user_id()) {
            self.users
                .increment_comments_received(&report.owner_id)
                .await?;
        }

        tracing::info!(
            "User {} commented on report {}",
            author.user_id(),
            report_id
        );

        self.events
            .publish(DomainEvent::CommentAdded {
                report,
                comment: comment.clone(),
            })
            .await;

        Ok(comment)
    }

    pub async fn list_comments(&self, report_id: Uuid) -> Result<Vec<Comment>> {
        if self.reports.find_by_id(report_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Report {} not found",
                report_id
            )));
        }
        self.comments.list_by_report(report_id).await
    }

    /// Only the author may delete a comment
    pub async fn delete_comment(&self, id: Uuid, user_id: &str) -> Result<()> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))?;

        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        if !self.comments.delete(id).await? {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }

        tracing::info!("User {} deleted comment {}", user_id, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::models::NotificationType;
    use crate::shared::test_helpers::{test_user, TestContext};

    #[tokio::test]
    async fn test_comment_from_neighbour_notifies_owner() {
        let ctx = TestContext::new();
        let owner = test_user();
        let neighbour = test_user();
        let report = ctx.create_road_report(&owner).await;

        let comment = ctx
            .comments_service()
            .add_comment(report.id, &neighbour, "  Same problem on my street  ")
            .await
            .unwrap();

        assert_eq!(comment.text, "Same problem on my street");
        assert_eq!(comment.user_name, neighbour.name);
        assert_eq!(ctx.user(&owner.sub).await.total_comments_received, 1);

        let comments: Vec<_> = ctx
            .notifications
            .all_for(&owner.sub)
            .into_iter()
            .filter(|n| n.notification_type == NotificationType::Comment)
            .collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].data.0.comment_id, Some(comment.id));
    }

    #[tokio::test]
    async fn test_own_comment_is_not_counted() {
        let ctx = TestContext::new();
        let owner = test_user();
        let report = ctx.create_road_report(&owner).await;

        ctx.comments_service()
            .add_comment(report.id, &owner, "Update: it got worse")
            .await
            .unwrap();

        assert_eq!(ctx.user(&owner.sub).await.total_comments_received, 0);
        assert!(ctx
            .notifications
            .all_for(&owner.sub)
            .iter()
            .all(|n| n.notification_type != NotificationType::Comment));
    }

    #[tokio::test]
    async fn test_comment_validation() {
        let ctx = TestContext::new();
        let report = ctx.create_road_report(&test_user()).await;
        let author = test_user();

        let err = ctx
            .comments_service()
            .add_comment(report.id, &author, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let long = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let err = ctx
            .comments_service()
            .add_comment(report.id, &author, &long)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = ctx
            .comments_service()
            .add_comment(Uuid::now_v7(), &author, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let ctx = TestContext::new();
        let report = ctx.create_road_report(&test_user()).await;
        let author = test_user();
        let service = ctx.comments_service();

        let first = service.add_comment(report.id, &author, "first").await.unwrap();
        let second = service.add_comment(report.id, &author, "second").await.unwrap();

        let listed = service.list_comments(report.id).await.unwrap();
        assert_eq!(
            listed.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }

    #[tokio::test]
    async fn test_only_author_deletes() {
        let ctx = TestContext::new();
        let owner = test_user();
        let author = test_user();
        let report = ctx.create_road_report(&owner).await;
        let service = ctx.comments_service();
        let comment = service.add_comment(report.id, &author, "hi").await.unwrap();

        let err = service
            .delete_comment(comment.id, owner.user_id())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service
            .delete_comment(comment.id, author.user_id())
            .await
            .unwrap();
        assert!(service.list_comments(report.id).await.unwrap().is_empty());

        let err = service
            .delete_comment(comment.id, author.user_id())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
