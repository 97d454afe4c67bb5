use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::events::{DomainEvent, EventListener};
use crate::features::notifications::models::{NotificationData, NotificationType};
use crate::features::notifications::services::NotificationDispatcher;

const COMMENT_EXCERPT_CHARS: usize = 80;

/// Turns lifecycle and comment events into notifications for the report owner.
/// Engagement toggles and report creation do not notify.
pub struct NotificationListener {
    dispatcher: Arc<NotificationDispatcher>,
}

impl NotificationListener {
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= COMMENT_EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(COMMENT_EXCERPT_CHARS).collect();
    format!("{}…", cut.trim_end())
}

#[async_trait]
impl EventListener for NotificationListener {
    fn name(&self) -> &'static str {
        "notifications"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event {
            DomainEvent::StatusChanged { report, from, .. } => {
                self.dispatcher
                    .notify(
                        &report.owner_id,
                        NotificationType::StatusUpdate,
                        "Report status updated",
                        format!(
                            "Your {} report moved from {} to {}",
                            report.category,
                            from.label(),
                            report.status.label()
                        ),
                        NotificationData::report(report.id),
                    )
                    .await;
            }
            DomainEvent::ReportEscalated { report, .. } => {
                let reason = report.escalation_reason.as_deref().unwrap_or_default();
                self.dispatcher
                    .notify(
                        &report.owner_id,
                        NotificationType::Escalation,
                        "Report escalated",
                        format!(
                            "Your {} report was escalated to level {}: {}",
                            report.category, report.escalation_level, reason
                        ),
                        NotificationData::report(report.id),
                    )
                    .await;
            }
            DomainEvent::ReportDeEscalated { report, .. } => {
                self.dispatcher
                    .notify(
                        &report.owner_id,
                        NotificationType::StatusUpdate,
                        "Emergency status removed",
                        format!(
                            "Your {} report is no longer marked as an emergency",
                            report.category
                        ),
                        NotificationData::report(report.id),
                    )
                    .await;
            }
            DomainEvent::CommentAdded { report, comment } if comment.user_id != report.owner_id => {
                let author = comment.user_name.as_deref().unwrap_or("Someone");
                self.dispatcher
                    .notify(
                        &report.owner_id,
                        NotificationType::Comment,
                        "New comment on your report",
                        format!(
                            "{} commented on your {} report: \"{}\"",
                            author,
                            report.category,
                            excerpt(&comment.text)
                        ),
                        NotificationData::comment(report.id, comment.id),
                    )
                    .await;
            }
            _ => {}
        }
        Ok(())
    }
}
