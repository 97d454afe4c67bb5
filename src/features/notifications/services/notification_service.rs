use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::{Notification, NotificationPage};
use crate::features::notifications::store::NotificationStore;
use crate::shared::types::PaginationQuery;

/// Recipient-facing notification operations
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
        pagination: &PaginationQuery,
    ) -> Result<NotificationPage> {
        self.store.list(user_id, unread_only, pagination).await
    }

    pub async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<Notification> {
        self.store
            .mark_read(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let changed = self.store.mark_all_read(user_id).await?;
        tracing::info!("Marked {} notifications read for user {}", changed, user_id);
        Ok(changed)
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<()> {
        if !self.store.delete(user_id, id).await? {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::models::{NotificationData, NotificationType};
    use crate::features::notifications::services::NotificationDispatcher;
    use crate::features::notifications::store::memory::InMemoryNotificationStore;

    async fn setup(count: usize) -> (NotificationService, Vec<Uuid>) {
        let store = Arc::new(InMemoryNotificationStore::new());
        let dispatcher = NotificationDispatcher::new(store.clone());
        let mut ids = Vec::new();
        for i in 0..count {
            let n = dispatcher
                .notify(
                    "alice",
                    NotificationType::System,
                    format!("Notice {}", i),
                    "body",
                    NotificationData::default(),
                )
                .await
                .unwrap();
            ids.push(n.id);
        }
        dispatcher
            .notify(
                "bob",
                NotificationType::System,
                "Other",
                "body",
                NotificationData::default(),
            )
            .await
            .unwrap();
        (NotificationService::new(store), ids)
    }

    #[tokio::test]
    async fn test_list_counts_unread_and_filters() {
        let (service, ids) = setup(3).await;
        service.mark_read("alice", ids[0]).await.unwrap();

        let page = service
            .list("alice", false, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.unread_count, 2);

        let unread = service
            .list("alice", true, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(unread.total, 2);
        assert!(unread.items.iter().all(|n| !n.read));
    }

    #[tokio::test]
    async fn test_cannot_touch_other_users_notifications() {
        let (service, ids) = setup(1).await;

        let err = service.mark_read("bob", ids[0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete("bob", ids[0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_all_read_then_delete() {
        let (service, ids) = setup(2).await;

        assert_eq!(service.mark_all_read("alice").await.unwrap(), 2);
        assert_eq!(service.mark_all_read("alice").await.unwrap(), 0);

        service.delete("alice", ids[1]).await.unwrap();
        let page = service
            .list("alice", false, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.unread_count, 0);
    }
}
