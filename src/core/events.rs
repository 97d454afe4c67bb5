//! Post-commit domain events.
//!
//! Services publish an event after their primary write has been applied. Listeners
//! (badge evaluation, notification generation) run in-process and in order before the
//! request returns; a failing listener is logged and never fails the publisher.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::comments::models::Comment;
use crate::features::reports::models::{Report, ReportStatus};

#[derive(Debug, Clone)]
pub enum DomainEvent {
    ReportCreated {
        report: Report,
    },
    StatusChanged {
        report: Report,
        from: ReportStatus,
        actor: String,
    },
    ReportEscalated {
        report: Report,
        actor: String,
    },
    ReportDeEscalated {
        report: Report,
        actor: String,
    },
    LikeToggled {
        report_id: uuid::Uuid,
        owner_id: String,
        user_id: String,
        liked: bool,
    },
    CommentAdded {
        report: Report,
        comment: Comment,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ReportCreated { .. } => "report.created",
            DomainEvent::StatusChanged { .. } => "report.status_changed",
            DomainEvent::ReportEscalated { .. } => "report.escalated",
            DomainEvent::ReportDeEscalated { .. } => "report.de_escalated",
            DomainEvent::LikeToggled { .. } => "report.like_toggled",
            DomainEvent::CommentAdded { .. } => "comment.added",
        }
    }
}

#[async_trait]
pub trait EventListener: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &DomainEvent) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Deliver `event` to every listener in registration order.
    pub async fn publish(&self, event: DomainEvent) {
        for listener in &self.listeners {
            if let Err(e) = listener.handle(&event).await {
                tracing::error!(
                    "Listener {} failed on {}: {:?}",
                    listener.name(),
                    event.name(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    #[async_trait]
    impl EventListener for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn handle(&self, _event: &DomainEvent) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl EventListener for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn handle(&self, _event: &DomainEvent) -> Result<()> {
            Err(AppError::Internal("sink unavailable".to_string()))
        }
    }

    fn like_event() -> DomainEvent {
        DomainEvent::LikeToggled {
            report_id: uuid::Uuid::now_v7(),
            owner_id: "owner".to_string(),
            user_id: "fan".to_string(),
            liked: true,
        }
    }

    #[tokio::test]
    async fn test_failing_listener_does_not_stop_later_listeners() {
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        let bus = EventBus::new()
            .with_listener(Arc::new(Failing))
            .with_listener(counter.clone());

        bus.publish(like_event()).await;
        bus.publish(like_event()).await;

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }
}
