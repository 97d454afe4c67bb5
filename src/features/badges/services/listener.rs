use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::events::{DomainEvent, EventListener};
use crate::features::badges::services::BadgeRuleEngine;

/// Re-evaluates the affected user's badges after stat-changing events.
pub struct BadgeListener {
    engine: Arc<BadgeRuleEngine>,
}

impl BadgeListener {
    pub fn new(engine: Arc<BadgeRuleEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventListener for BadgeListener {
    fn name(&self) -> &'static str {
        "badges"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        let user_id = match event {
            DomainEvent::ReportCreated { report } => &report.owner_id,
            DomainEvent::LikeToggled {
                owner_id,
                liked: true,
                ..
            } => owner_id,
            DomainEvent::CommentAdded { report, comment } if comment.user_id != report.owner_id => {
                &report.owner_id
            }
            _ => return Ok(()),
        };

        self.engine.evaluate(user_id).await?;
        Ok(())
    }
}
