use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::badges::{BadgeCatalog, BadgeDefinition};
use crate::features::reports::models::Report;
use crate::features::reports::store::ReportStore;
use crate::features::users::models::{NotificationSettingsUpdate, User, UserIdentity};
use crate::features::users::store::UserStore;

/// Service for the current user's profile, preferences, reports and badges
pub struct ProfileService {
    users: Arc<dyn UserStore>,
    reports: Arc<dyn ReportStore>,
    catalog: Arc<BadgeCatalog>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserStore>,
        reports: Arc<dyn ReportStore>,
        catalog: Arc<BadgeCatalog>,
    ) -> Self {
        Self {
            users,
            reports,
            catalog,
        }
    }

    /// Profile of the caller, provisioning the row on first use
    pub async fn get_profile(&self, user: &AuthenticatedUser) -> Result<User> {
        self.users.ensure(&UserIdentity::from(user)).await
    }

    pub async fn my_reports(&self, user_id: &str) -> Result<Vec<Report>> {
        self.reports.list_by_owner(user_id).await
    }

    pub async fn delete_report(&self, user_id: &str, report_id: Uuid) -> Result<()> {
        let report = self
            .reports
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        if !report.is_owned_by(user_id) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this report".to_string(),
            ));
        }

        if !self.reports.delete(report_id).await? {
            return Err(AppError::NotFound(format!("Report {} not found", report_id)));
        }

        tracing::info!("User {} deleted report {}", user_id, report_id);
        Ok(())
    }

    pub async fn update_language(&self, user: &AuthenticatedUser, language: &str) -> Result<User> {
        self.users.ensure(&UserIdentity::from(user)).await?;
        self.users
            .update_language(user.user_id(), language)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_notification_settings(
        &self,
        user: &AuthenticatedUser,
        update: NotificationSettingsUpdate,
    ) -> Result<User> {
        self.users.ensure(&UserIdentity::from(user)).await?;
        self.users
            .update_notification_settings(user.user_id(), update)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Badge snapshot of the caller
    pub async fn my_badges(&self, user: &AuthenticatedUser) -> Result<(User, Vec<BadgeDefinition>)> {
        let profile = self.get_profile(user).await?;
        let earned = self.earned(&profile);
        Ok((profile, earned))
    }

    /// Badge snapshot of any user
    pub async fn badges_of(&self, user_id: &str) -> Result<(User, Vec<BadgeDefinition>)> {
        let profile = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let earned = self.earned(&profile);
        Ok((profile, earned))
    }

    /// Held badges in the order they were earned. Ids no longer in the catalog are skipped.
    fn earned(&self, user: &User) -> Vec<BadgeDefinition> {
        user.badges
            .iter()
            .filter_map(|id| self.catalog.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_user, TestContext};

    #[tokio::test]
    async fn test_get_profile_provisions_defaults() {
        let ctx = TestContext::new();
        let user = test_user();

        let profile = ctx.profile().get_profile(&user).await.unwrap();
        assert_eq!(profile.id, user.sub);
        assert_eq!(profile.language, "en");
        assert_eq!(profile.points, 0);
        assert!(profile.badges.is_empty());
        assert!(profile.notification_settings().status_updates);
        assert!(!profile.notification_settings().email);
    }

    #[tokio::test]
    async fn test_delete_report_requires_ownership() {
        let ctx = TestContext::new();
        let owner = test_user();
        let stranger = test_user();
        let report = ctx.create_road_report(&owner).await;

        let err = ctx
            .profile()
            .delete_report(stranger.user_id(), report.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        ctx.profile()
            .delete_report(owner.user_id(), report.id)
            .await
            .unwrap();
        let err = ctx
            .profile()
            .delete_report(owner.user_id(), report.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_badges_follow_earned_order() {
        let ctx = TestContext::new();
        let user = test_user();
        ctx.create_road_report(&user).await;

        let (profile, badges) = ctx.profile().my_badges(&user).await.unwrap();
        assert_eq!(profile.points, 60);
        assert_eq!(
            badges.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec!["first_report"]
        );

        let err = ctx.profile().badges_of("nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_settings_partially() {
        let ctx = TestContext::new();
        let user = test_user();

        let updated = ctx
            .profile()
            .update_notification_settings(
                &user,
                NotificationSettingsUpdate {
                    email: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let settings = updated.notification_settings();
        assert!(settings.email);
        assert!(settings.likes);

        let updated = ctx.profile().update_language(&user, "ta").await.unwrap();
        assert_eq!(updated.language, "ta");
    }
}
