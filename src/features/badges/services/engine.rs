use std::sync::Arc;

use crate::core::error::Result;
use crate::features::badges::BadgeCatalog;
use crate::features::notifications::models::{NotificationData, NotificationType};
use crate::features::notifications::services::NotificationDispatcher;
use crate::features::users::store::UserStore;

/// Grants badges whose thresholds a user has crossed. Badges are never revoked.
pub struct BadgeRuleEngine {
    users: Arc<dyn UserStore>,
    catalog: Arc<BadgeCatalog>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl BadgeRuleEngine {
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: Arc<BadgeCatalog>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            users,
            catalog,
            dispatcher,
        }
    }

    /// Returns the ids of badges granted by this call, in catalog order.
    pub async fn evaluate(&self, user_id: &str) -> Result<Vec<String>> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            tracing::warn!("Skipping badge evaluation for unknown user {}", user_id);
            return Ok(vec![]);
        };

        let stats = user.badge_stats();
        let mut granted = Vec::new();

        for badge in self.catalog.newly_earned(&user.badges, &stats) {
            // A concurrent evaluation may have granted it since the read above
            if !self.users.grant_badge(user_id, badge.id, badge.points).await? {
                continue;
            }

            tracing::info!("User {} earned badge {}", user_id, badge.id);
            self.dispatcher
                .notify(
                    user_id,
                    NotificationType::BadgeEarned,
                    format!("{} New Badge Earned!", badge.icon),
                    format!(
                        "Congratulations! You've earned the \"{}\" badge. {}",
                        badge.name, badge.description
                    ),
                    NotificationData::badge(badge.id),
                )
                .await;
            granted.push(badge.id.to_string());
        }

        Ok(granted)
    }
}
