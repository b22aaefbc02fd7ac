//! Port for notification inbox persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{FeedQuery, Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

/// Port for reading and writing user inboxes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a notification.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// Store a notification unless the recipient already holds one with the
    /// same kind, title, and payload entity. The check and the write are a
    /// single step, so concurrent callers store at most one copy. Returns
    /// whether the notification was stored.
    async fn insert_once(&self, notification: &Notification) -> Result<bool, NotificationRepositoryError>;

    /// Newest-first slice of an inbox holding at most `query.limit` items.
    async fn feed(
        &self,
        user_id: &UserId,
        query: FeedQuery,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Number of unread notifications.
    async fn unread_count(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Mark one of the user's notifications read. Returns `false` when the
    /// user has no notification with that id.
    async fn mark_read(&self, user_id: &UserId, id: &Uuid) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread notification read, returning how many changed.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;
}
