//! Vet appointment requests and their status lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::optional_text;
use crate::domain::{Error, UserId};

/// Where the consultation takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitType {
    Clinic,
    Farm,
}

impl VisitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clinic => "CLINIC",
            Self::Farm => "FARM",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "CLINIC" => Some(Self::Clinic),
            "FARM" => Some(Self::Farm),
            _ => None,
        }
    }
}

/// Booking lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Requested,
    Confirmed,
    Declined,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [Self; 6] = [
        Self::Requested,
        Self::Confirmed,
        Self::Declined,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Confirmed => "CONFIRMED",
            Self::Declined => "DECLINED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "REQUESTED" => Some(Self::Requested),
            "CONFIRMED" => Some(Self::Confirmed),
            "DECLINED" => Some(Self::Declined),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether a booking may move from `self` to `next`.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Requested, Confirmed | Declined | Cancelled)
                | (Confirmed, InProgress | Cancelled)
                | (InProgress, Completed)
        )
    }

    /// Statuses the owner hears about when the vet applies them.
    pub fn notifies_owner(self) -> bool {
        matches!(self, Self::Confirmed | Self::Declined | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An appointment between an owner and a vet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub owner_id: UserId,
    pub vet_id: UserId,
    pub case_id: Option<Uuid>,
    pub visit_type: VisitType,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub vet_id: UserId,
    pub case_id: Option<Uuid>,
    pub visit_type: VisitType,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Which bookings a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    Owner(UserId),
    Vet(UserId),
    All,
}

impl Booking {
    /// Build a `REQUESTED` booking, checking the time lies in the future.
    pub fn request(owner_id: UserId, input: NewBooking, now: DateTime<Utc>) -> Result<Self, Error> {
        if input.scheduled_at <= now {
            return Err(crate::domain::invalid_field(
                "scheduledAt",
                "in_past",
                "scheduledAt must be in the future",
                Some(json!(input.scheduled_at.to_rfc3339())),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            vet_id: input.vet_id,
            case_id: input.case_id,
            visit_type: input.visit_type,
            scheduled_at: input.scheduled_at,
            notes: optional_text("notes", input.notes.as_deref(), 2000)?,
            status: BookingStatus::Requested,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `user` takes part in this booking.
    pub fn involves(&self, user: UserId) -> bool {
        self.owner_id == user || self.vet_id == user
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, next: BookingStatus, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            return Err(Error::conflict(format!(
                "booking cannot move from {} to {}",
                self.status, next
            ))
            .with_details(json!({ "from": self.status, "to": next })));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}
