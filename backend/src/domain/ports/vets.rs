//! Driving ports for the vet directory.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::{
    Actor, Availability, Error, UserId, VetListing, VetProfile, VetProfileInput, VetSearch,
};

/// Vet-owned mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VetsCommand: Send + Sync {
    /// Create or replace the caller's directory entry.
    async fn upsert_my_profile(&self, actor: &Actor, input: VetProfileInput) -> Result<VetProfile, Error>;

    /// Replace the caller's weekly availability.
    async fn set_availability(&self, actor: &Actor, availability: Availability) -> Result<Availability, Error>;
}

/// Directory reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VetsQuery: Send + Sync {
    /// Public search over approved vets.
    async fn search(&self, search: VetSearch, page: PageParams) -> Result<Paginated<VetListing>, Error>;

    /// Public view of an approved vet.
    async fn get(&self, vet_id: UserId) -> Result<VetProfile, Error>;

    /// Public availability of an approved vet.
    async fn availability(&self, vet_id: UserId) -> Result<Availability, Error>;

    /// The caller's own entry, in any status.
    async fn my_profile(&self, actor: &Actor) -> Result<VetProfile, Error>;
}
