//! Driving ports for vet bookings.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};
use uuid::Uuid;

use crate::domain::{Actor, Booking, BookingStatus, Error, NewBooking};

/// Booking mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingsCommand: Send + Sync {
    /// Request an appointment as an owner.
    async fn create(&self, actor: &Actor, input: NewBooking) -> Result<Booking, Error>;

    /// Apply a lifecycle transition as the vet, or cancel as the owner.
    async fn update_status(&self, actor: &Actor, id: Uuid, status: BookingStatus) -> Result<Booking, Error>;
}

/// Booking reads scoped by role.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingsQuery: Send + Sync {
    async fn list(
        &self,
        actor: &Actor,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> Result<Paginated<Booking>, Error>;

    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Booking, Error>;
}
