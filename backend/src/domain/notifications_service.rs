//! Notification inbox service and the dispatcher other services emit through.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Cursor;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{
    FeedRequest, NotificationRepository, NotificationRepositoryError, NotificationSink,
    NotificationsCommand, NotificationsQuery, SettingsRepository,
};
use crate::domain::{
    Actor, Error, FEED_DEFAULT_LIMIT, FEED_MAX_LIMIT, FeedKey, FeedQuery, NewNotification,
    Notification, NotificationFeed, PlatformSettings, invalid_field,
};

pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

/// Stores notifications on behalf of other services.
///
/// Honours the `notifications_enabled` platform setting. Storage failures are
/// logged and swallowed so they never fail the operation that triggered them.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationRepository>,
    settings: Arc<dyn SettingsRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        settings: Arc<dyn SettingsRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            settings,
            clock,
        }
    }

    async fn enabled(&self) -> bool {
        match self.settings.load().await {
            Ok(stored) => PlatformSettings::from_stored(stored).notifications_enabled(),
            Err(error) => {
                warn!(%error, "could not read notification setting; assuming enabled");
                true
            }
        }
    }

    async fn store(&self, notification: NewNotification) -> Option<Notification> {
        let stored = notification.into_notification(self.clock.utc());
        match self.notifications.insert(&stored).await {
            Ok(()) => {
                debug!(user_id = %stored.user_id, kind = stored.kind.as_str(), title = %stored.title, "notification stored");
                Some(stored)
            }
            Err(error) => {
                warn!(%error, user_id = %stored.user_id, title = %stored.title, "failed to store notification");
                None
            }
        }
    }
}

#[async_trait]
impl NotificationSink for NotificationDispatcher {
    async fn notify(&self, notification: NewNotification) -> Option<Notification> {
        if !self.enabled().await {
            debug!(title = %notification.title, "notifications disabled; dropping");
            return None;
        }
        self.store(notification).await
    }

    async fn notify_once(&self, notification: NewNotification) -> Option<Notification> {
        if !self.enabled().await {
            debug!(title = %notification.title, "notifications disabled; dropping");
            return None;
        }
        let stored = notification.into_notification(self.clock.utc());
        match self.notifications.insert_once(&stored).await {
            Ok(true) => {
                debug!(user_id = %stored.user_id, kind = stored.kind.as_str(), title = %stored.title, "notification stored");
                Some(stored)
            }
            Ok(false) => None,
            Err(error) => {
                warn!(%error, user_id = %stored.user_id, title = %stored.title, "failed to store notification");
                None
            }
        }
    }
}

/// Inbox service implementing the notification driving ports.
#[derive(Clone)]
pub struct NotificationsService<R> {
    notifications: Arc<R>,
}

impl<R> NotificationsService<R> {
    pub fn new(notifications: Arc<R>) -> Self {
        Self { notifications }
    }
}

fn decode_cursor(raw: Option<&str>) -> Result<Option<FeedKey>, Error> {
    raw.filter(|token| !token.trim().is_empty())
        .map(|token| {
            Cursor::<FeedKey>::decode(token)
                .map(Cursor::into_key)
                .map_err(|err| {
                    invalid_field("cursor", "invalid_cursor", err.to_string(), Some(json!(token)))
                })
        })
        .transpose()
}

#[async_trait]
impl<R> NotificationsQuery for NotificationsService<R>
where
    R: NotificationRepository,
{
    async fn feed(&self, actor: &Actor, request: FeedRequest) -> Result<NotificationFeed, Error> {
        let limit = request.limit.unwrap_or(FEED_DEFAULT_LIMIT);
        if limit == 0 || limit > FEED_MAX_LIMIT {
            return Err(invalid_field(
                "limit",
                "out_of_range",
                format!("limit must be between 1 and {FEED_MAX_LIMIT}"),
                Some(json!(limit)),
            ));
        }
        let before = decode_cursor(request.cursor.as_deref())?;
        let mut data = self
            .notifications
            .feed(
                &actor.user_id,
                FeedQuery {
                    unread_only: request.unread_only,
                    before,
                    limit: limit + 1,
                },
            )
            .await
            .map_err(map_notification_error)?;

        let next_cursor = if data.len() > limit as usize {
            data.truncate(limit as usize);
            data.last()
                .map(|last| Cursor::new(FeedKey::of(last)).encode())
                .transpose()
                .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))?
        } else {
            None
        };
        Ok(NotificationFeed { data, next_cursor })
    }

    async fn unread_count(&self, actor: &Actor) -> Result<u64, Error> {
        self.notifications
            .unread_count(&actor.user_id)
            .await
            .map_err(map_notification_error)
    }
}

#[async_trait]
impl<R> NotificationsCommand for NotificationsService<R>
where
    R: NotificationRepository,
{
    async fn mark_read(&self, actor: &Actor, id: Uuid) -> Result<(), Error> {
        let updated = self
            .notifications
            .mark_read(&actor.user_id, &id)
            .await
            .map_err(map_notification_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::not_found(format!("notification {id} not found")))
        }
    }

    async fn mark_all_read(&self, actor: &Actor) -> Result<u64, Error> {
        self.notifications
            .mark_all_read(&actor.user_id)
            .await
            .map_err(map_notification_error)
    }
}

#[cfg(test)]
#[path = "notifications_service_tests.rs"]
mod tests;
