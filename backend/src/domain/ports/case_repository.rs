//! Port for health case persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Case, CaseFilter, CaseScope};

use super::define_port_error;

define_port_error! {
    /// Errors raised by case repository adapters.
    pub enum CaseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "case repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "case repository query failed: {message}",
    }
}

/// Port for storing health cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// List cases visible within `scope`, newest first.
    async fn list(
        &self,
        scope: CaseScope,
        filter: &CaseFilter,
    ) -> Result<Vec<Case>, CaseRepositoryError>;

    /// Find a case by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Case>, CaseRepositoryError>;

    /// Insert or replace a case.
    async fn save(&self, case: &Case) -> Result<(), CaseRepositoryError>;
}
