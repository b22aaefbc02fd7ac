//! Driving ports for the caller's notification inbox.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Actor, Error, Notification, NotificationFeed};

/// Feed request as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRequest {
    pub unread_only: bool,
    /// Opaque cursor returned by a previous page.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// Inbox mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsCommand: Send + Sync {
    async fn mark_read(&self, actor: &Actor, id: Uuid) -> Result<(), Error>;

    /// Returns how many notifications changed.
    async fn mark_all_read(&self, actor: &Actor) -> Result<u64, Error>;
}

/// Inbox reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsQuery: Send + Sync {
    async fn feed(&self, actor: &Actor, request: FeedRequest) -> Result<NotificationFeed, Error>;
    async fn unread_count(&self, actor: &Actor) -> Result<u64, Error>;
}

/// Capability other services use to emit notifications.
///
/// Delivery is best effort: failures are logged by the implementation and
/// never surface to the caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Store a notification unless notifications are disabled.
    async fn notify(&self, notification: crate::domain::NewNotification) -> Option<Notification>;

    /// Like [`NotificationSink::notify`], but skip when the same
    /// `(user, type, title, entity)` notification already exists.
    async fn notify_once(&self, notification: crate::domain::NewNotification) -> Option<Notification>;
}
