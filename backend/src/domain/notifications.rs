//! In-app notifications delivered to user inboxes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;

/// Default number of notifications per feed page.
pub const FEED_DEFAULT_LIMIT: u32 = 20;
/// Largest feed page a client may request.
pub const FEED_MAX_LIMIT: u32 = 100;

/// Area of the platform a notification relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Booking,
    Case,
    Order,
    Vet,
    System,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booking => "BOOKING",
            Self::Case => "CASE",
            Self::Order => "ORDER",
            Self::Vet => "VET",
            Self::System => "SYSTEM",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "BOOKING" => Some(Self::Booking),
            "CASE" => Some(Self::Case),
            "ORDER" => Some(Self::Order),
            "VET" => Some(Self::Vet),
            "SYSTEM" => Some(Self::System),
            _ => None,
        }
    }
}

/// Link from a notification to the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[schema(example = "booking")]
    pub entity_type: String,
    pub entity_id: Uuid,
    #[schema(example = "/bookings/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub action_url: String,
}

impl NotificationPayload {
    /// Payload pointing at `/{collection}/{id}`.
    pub fn for_entity(entity_type: &str, collection: &str, entity_id: Uuid) -> Self {
        Self {
            entity_type: entity_type.to_owned(),
            entity_id,
            action_url: format!("/{collection}/{entity_id}"),
        }
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub payload: Option<NotificationPayload>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Entity the notification points at, used for de-duplication.
    pub fn entity_id(&self) -> Option<Uuid> {
        self.payload.as_ref().map(|p| p.entity_id)
    }

    /// Whether `other` is a copy of this notification for de-duplication:
    /// same recipient, kind, title, and entity.
    pub fn duplicates(&self, other: &Notification) -> bool {
        self.user_id == other.user_id
            && self.kind == other.kind
            && self.title == other.title
            && self.entity_id() == other.entity_id()
    }
}

/// Notification content before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub payload: Option<NotificationPayload>,
}

impl NewNotification {
    pub fn new(
        user_id: UserId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: NotificationPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Materialise the notification at `now`.
    pub fn into_notification(self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            payload: self.payload,
            read: false,
            created_at: now,
        }
    }
}

/// Sort key of the newest-first feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedKey {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl FeedKey {
    pub fn of(notification: &Notification) -> Self {
        Self {
            created_at: notification.created_at,
            id: notification.id,
        }
    }
}

/// Feed query against one inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub unread_only: bool,
    /// Only items strictly older than this key.
    pub before: Option<FeedKey>,
    pub limit: u32,
}

/// One page of the notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    pub data: Vec<Notification>,
    /// Opaque cursor for the following page.
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn kind_serialises_as_type() {
        let note = NewNotification::new(
            UserId::random(),
            NotificationType::Booking,
            "New booking request",
            "A farmer requested a visit",
        )
        .with_payload(NotificationPayload::for_entity("booking", "bookings", Uuid::nil()))
        .into_notification(Utc::now());
        let value = serde_json::to_value(&note).expect("serialise");
        assert_eq!(value["type"], "BOOKING");
        assert_eq!(value["read"], false);
        assert_eq!(
            value["payload"]["actionUrl"],
            "/bookings/00000000-0000-0000-0000-000000000000"
        );
    }

    #[rstest]
    fn feed_keys_order_by_time_then_id() {
        let now = Utc::now();
        let older = FeedKey { created_at: now - chrono::Duration::seconds(1), id: Uuid::max() };
        let newer = FeedKey { created_at: now, id: Uuid::nil() };
        assert!(older < newer);
    }
}
