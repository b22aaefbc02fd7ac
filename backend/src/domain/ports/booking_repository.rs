//! Port for booking persistence.

use async_trait::async_trait;
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::{Booking, BookingScope, BookingStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
    }
}

/// Port for storing vet bookings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Page through bookings in `scope`, soonest appointment first.
    async fn list(
        &self,
        scope: BookingScope,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> Result<(Vec<Booking>, u64), BookingRepositoryError>;

    /// Find a booking by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Insert or replace a booking.
    async fn save(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;
}
