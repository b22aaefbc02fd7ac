//! Marketplace service: the public catalogue and the seller workspace.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::domain::orders_service::map_order_error;
use crate::domain::ports::{
    MarketplaceQuery, OrderRepository, ProductRepository, ProductRepositoryError,
    SellerCommand, SellerProfileRepository, SellerProfileRepositoryError, SellerQuery,
};
use crate::domain::{
    Actor, Error, NewProduct, Product, ProductListing, ProductPatch, ProductSearch,
    SellerDashboard, SellerProfile, SellerProfileInput, rank_by_distance,
};

pub(crate) fn map_product_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
    }
}

fn map_seller_profile_error(error: SellerProfileRepositoryError) -> Error {
    match error {
        SellerProfileRepositoryError::Connection { message } => Error::service_unavailable(
            format!("seller profile repository unavailable: {message}"),
        ),
        SellerProfileRepositoryError::Query { message } => {
            Error::internal(format!("seller profile repository error: {message}"))
        }
    }
}

/// Marketplace service implementing the catalogue and seller ports.
#[derive(Clone)]
pub struct MarketplaceService<P, S, O> {
    products: Arc<P>,
    profiles: Arc<S>,
    orders: Arc<O>,
    clock: Arc<dyn Clock>,
}

impl<P, S, O> MarketplaceService<P, S, O> {
    pub fn new(products: Arc<P>, profiles: Arc<S>, orders: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            products,
            profiles,
            orders,
            clock,
        }
    }
}

impl<P, S, O> MarketplaceService<P, S, O>
where
    P: ProductRepository,
    S: SellerProfileRepository,
    O: OrderRepository,
{
    async fn find(&self, id: Uuid) -> Result<Option<Product>, Error> {
        self.products.find_by_id(&id).await.map_err(map_product_error)
    }

    /// A product listed by the acting seller. Other sellers' products read as
    /// missing.
    async fn owned(&self, actor: &Actor, id: Uuid) -> Result<Product, Error> {
        actor.require_seller()?;
        self.find(id)
            .await?
            .filter(|product| product.seller_id == actor.user_id)
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }

    async fn store(&self, product: Product) -> Result<Product, Error> {
        self.products
            .save(&product)
            .await
            .map_err(map_product_error)?;
        Ok(product)
    }
}

#[async_trait]
impl<P, S, O> MarketplaceQuery for MarketplaceService<P, S, O>
where
    P: ProductRepository,
    S: SellerProfileRepository,
    O: OrderRepository,
{
    async fn search(
        &self,
        search: ProductSearch,
        page: PageParams,
    ) -> Result<Paginated<ProductListing>, Error> {
        let products = self
            .products
            .search_visible(&search)
            .await
            .map_err(map_product_error)?;
        let listings: Vec<ProductListing> = match search.proximity {
            Some(filter) => rank_by_distance(products, filter, Product::location)
                .into_iter()
                .map(|(product, distance_km)| ProductListing {
                    product,
                    distance_km,
                })
                .collect(),
            None => products
                .into_iter()
                .map(|product| ProductListing {
                    product,
                    distance_km: None,
                })
                .collect(),
        };
        Ok(Paginated::from_full(listings, page))
    }

    async fn get(&self, id: Uuid) -> Result<Product, Error> {
        self.find(id)
            .await?
            .filter(Product::is_visible)
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }
}

#[async_trait]
impl<P, S, O> SellerCommand for MarketplaceService<P, S, O>
where
    P: ProductRepository,
    S: SellerProfileRepository,
    O: OrderRepository,
{
    async fn create_product(&self, actor: &Actor, input: NewProduct) -> Result<Product, Error> {
        actor.require_seller()?;
        let product = Product::create(actor.user_id, input, self.clock.utc())?;
        let product = self.store(product).await?;
        info!(product_id = %product.id, seller_id = %actor.user_id, "product listed");
        Ok(product)
    }

    async fn update_product(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Product, Error> {
        let mut product = self.owned(actor, id).await?;
        product.apply_seller_patch(patch, self.clock.utc())?;
        self.store(product).await
    }

    async fn deactivate_product(&self, actor: &Actor, id: Uuid) -> Result<Product, Error> {
        let mut product = self.owned(actor, id).await?;
        if !product.is_active {
            return Ok(product);
        }
        product.is_active = false;
        product.updated_at = self.clock.utc();
        self.store(product).await
    }

    async fn upsert_profile(
        &self,
        actor: &Actor,
        input: SellerProfileInput,
    ) -> Result<SellerProfile, Error> {
        actor.require_seller()?;
        let profile = SellerProfile::build(actor.user_id, input, self.clock.utc())?;
        self.profiles
            .save(&profile)
            .await
            .map_err(map_seller_profile_error)?;
        Ok(profile)
    }
}

#[async_trait]
impl<P, S, O> SellerQuery for MarketplaceService<P, S, O>
where
    P: ProductRepository,
    S: SellerProfileRepository,
    O: OrderRepository,
{
    async fn list_my_products(&self, actor: &Actor) -> Result<Vec<Product>, Error> {
        actor.require_seller()?;
        self.products
            .list_by_seller(&actor.user_id)
            .await
            .map_err(map_product_error)
    }

    async fn profile(&self, actor: &Actor) -> Result<SellerProfile, Error> {
        actor.require_seller()?;
        self.profiles
            .find_by_user(&actor.user_id)
            .await
            .map_err(map_seller_profile_error)?
            .ok_or_else(|| Error::not_found("you have not set up a store profile yet"))
    }

    async fn dashboard(&self, actor: &Actor) -> Result<SellerDashboard, Error> {
        let products = self.list_my_products(actor).await?;
        let totals = self
            .orders
            .seller_totals(&actor.user_id)
            .await
            .map_err(map_order_error)?;
        Ok(SellerDashboard {
            products_count: products.len() as u64,
            active_products_count: products.iter().filter(|p| p.is_active).count() as u64,
            orders_count: totals.orders_count,
            pending_orders_count: totals.pending_orders_count,
            inventory_count: products.iter().map(|p| i64::from(p.stock_qty)).sum(),
            revenue: totals.delivered_revenue,
        })
    }
}

#[cfg(test)]
#[path = "marketplace_service_tests.rs"]
mod tests;
