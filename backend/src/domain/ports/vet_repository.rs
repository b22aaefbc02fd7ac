//! Port for the vet directory and availability schedules.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::{Availability, UserId, VetProfile, VetSearch, VetStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vet repository adapters.
    pub enum VetRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "vet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "vet repository query failed: {message}",
    }
}

/// Port for vet directory entries.
///
/// Adapters fill [`VetProfile::name`] from the owning account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VetRepository: Send + Sync {
    /// Find the directory entry of a vet.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<VetProfile>, VetRepositoryError>;

    /// Insert or replace a directory entry.
    async fn save(&self, profile: &VetProfile) -> Result<(), VetRepositoryError>;

    /// Approved entries matching the text and flag filters of `search`,
    /// ordered by rating then name. Proximity is applied by the caller.
    async fn search_approved(&self, search: &VetSearch) -> Result<Vec<VetProfile>, VetRepositoryError>;

    /// Page through entries, optionally by status, newest first.
    async fn list_by_status(
        &self,
        status: Option<VetStatus>,
        page: PageParams,
    ) -> Result<(Vec<VetProfile>, u64), VetRepositoryError>;

    /// Read a vet's weekly availability.
    async fn find_availability(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Availability>, VetRepositoryError>;

    /// Replace a vet's weekly availability.
    async fn save_availability(
        &self,
        user_id: &UserId,
        availability: &Availability,
    ) -> Result<(), VetRepositoryError>;
}
