use std::sync::Arc;

use crate::features::notifications::models::{
    NewNotification, Notification, NotificationData, NotificationType,
};
use crate::features::notifications::store::NotificationStore;

/// Creates notification records on behalf of the engines.
///
/// Dispatch never fails its caller: sink errors are logged and swallowed.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn notify(
        &self,
        recipient: &str,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        data: NotificationData,
    ) -> Option<Notification> {
        let new = NewNotification {
            user_id: recipient.to_string(),
            notification_type,
            title: title.into(),
            message: message.into(),
            data,
        };

        match self.store.create(new).await {
            Ok(notification) => {
                tracing::debug!(
                    "Created {:?} notification {} for user {}",
                    notification_type,
                    notification.id,
                    recipient
                );
                Some(notification)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to dispatch {:?} notification to {}: {:?}",
                    notification_type,
                    recipient,
                    e
                );
                None
            }
        }
    }
}
