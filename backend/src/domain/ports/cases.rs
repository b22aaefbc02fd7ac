//! Driving ports for health cases.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Actor, Case, CaseFilter, Error, NewCase, UserId};

/// Case mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CasesCommand: Send + Sync {
    /// Submit a case as its owner.
    async fn create(&self, actor: &Actor, input: NewCase) -> Result<Case, Error>;

    /// Assign an approved vet. Allowed for the owner or an admin.
    async fn assign_vet(&self, actor: &Actor, id: Uuid, vet_id: UserId) -> Result<Case, Error>;

    /// Close a case as its owner.
    async fn close(&self, actor: &Actor, id: Uuid) -> Result<Case, Error>;
}

/// Case reads scoped by role.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CasesQuery: Send + Sync {
    async fn list(&self, actor: &Actor, filter: CaseFilter) -> Result<Vec<Case>, Error>;
    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Case, Error>;
}
