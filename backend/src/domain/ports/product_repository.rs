//! Port for marketplace product persistence.

use async_trait::async_trait;
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::{Product, ProductAdminFilter, ProductSearch, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
    }
}

/// Port for storing product listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Visible products matching the text filters of `search`, newest first.
    ///
    /// The full match set is returned; proximity ranking and paging happen in
    /// the caller so totals reflect the radius filter.
    async fn search_visible(&self, search: &ProductSearch) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Find a product by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, ProductRepositoryError>;

    /// Find several products. Unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, ProductRepositoryError>;

    /// All of a seller's products, newest first.
    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Page through every product for moderation, newest first.
    async fn list_for_admin(
        &self,
        filter: &ProductAdminFilter,
        page: PageParams,
    ) -> Result<(Vec<Product>, u64), ProductRepositoryError>;

    /// Insert or replace a product.
    async fn save(&self, product: &Product) -> Result<(), ProductRepositoryError>;
}
