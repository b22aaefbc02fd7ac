//! Driving ports for the public marketplace and the seller workspace.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};
use uuid::Uuid;

use crate::domain::{
    Actor, Error, NewProduct, Product, ProductListing, ProductPatch, ProductSearch,
    SellerDashboard, SellerProfile, SellerProfileInput,
};

/// Public catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceQuery: Send + Sync {
    /// Search visible products.
    async fn search(&self, search: ProductSearch, page: PageParams) -> Result<Paginated<ProductListing>, Error>;

    /// A visible product.
    async fn get(&self, id: Uuid) -> Result<Product, Error>;
}

/// Seller-owned mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SellerCommand: Send + Sync {
    async fn create_product(&self, actor: &Actor, input: NewProduct) -> Result<Product, Error>;
    async fn update_product(&self, actor: &Actor, id: Uuid, patch: ProductPatch) -> Result<Product, Error>;
    async fn deactivate_product(&self, actor: &Actor, id: Uuid) -> Result<Product, Error>;
    async fn upsert_profile(&self, actor: &Actor, input: SellerProfileInput) -> Result<SellerProfile, Error>;
}

/// Seller workspace reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SellerQuery: Send + Sync {
    async fn list_my_products(&self, actor: &Actor) -> Result<Vec<Product>, Error>;
    async fn profile(&self, actor: &Actor) -> Result<SellerProfile, Error>;
    async fn dashboard(&self, actor: &Actor) -> Result<SellerDashboard, Error>;
}
