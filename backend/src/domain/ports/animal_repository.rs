//! Port for livestock record persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Animal, AnimalFilter, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by animal repository adapters.
    pub enum AnimalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "animal repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "animal repository query failed: {message}",
    }
}

/// Port for storing animals with their embedded health records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimalRepository: Send + Sync {
    /// List an owner's animals, newest first.
    async fn list_for_owner(
        &self,
        owner_id: &UserId,
        filter: &AnimalFilter,
    ) -> Result<Vec<Animal>, AnimalRepositoryError>;

    /// Find an animal by id regardless of owner.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Animal>, AnimalRepositoryError>;

    /// Insert or replace an animal.
    async fn save(&self, animal: &Animal) -> Result<(), AnimalRepositoryError>;

    /// Delete an animal. Returns `false` when nothing was removed.
    async fn delete(&self, id: &Uuid) -> Result<bool, AnimalRepositoryError>;
}
