//! Port for seller storefront persistence.

use async_trait::async_trait;

use crate::domain::{SellerProfile, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by seller profile repository adapters.
    pub enum SellerProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "seller profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "seller profile repository query failed: {message}",
    }
}

/// Port for storefront details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SellerProfileRepository: Send + Sync {
    /// Find a seller's storefront.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SellerProfile>, SellerProfileRepositoryError>;

    /// Insert or replace a storefront.
    async fn save(&self, profile: &SellerProfile) -> Result<(), SellerProfileRepositoryError>;
}
