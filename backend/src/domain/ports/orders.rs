//! Driving ports for orders and cart checkout.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};
use uuid::Uuid;

use crate::domain::{
    Actor, Cart, CartView, DeliveryOption, Error, Order, OrderRequest, OrderStatus,
};

/// Delivery details supplied at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub delivery_option: DeliveryOption,
    pub delivery_district: Option<String>,
    pub delivery_address: Option<String>,
}

/// Order mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersCommand: Send + Sync {
    /// Place one order with a single seller.
    async fn place(&self, actor: &Actor, request: OrderRequest) -> Result<Order, Error>;

    /// Cancel as buyer or seller while the order is pending or confirmed.
    async fn cancel(&self, actor: &Actor, id: Uuid) -> Result<Order, Error>;

    /// Advance an order as its seller.
    async fn update_status(&self, actor: &Actor, id: Uuid, status: OrderStatus) -> Result<Order, Error>;

    /// Place one order per seller for the cart's lines.
    ///
    /// Either every order is placed or none remain: orders placed before a
    /// failure are cancelled again.
    async fn checkout(&self, actor: &Actor, cart: Cart, request: CheckoutRequest) -> Result<Vec<Order>, Error>;
}

/// Order reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersQuery: Send + Sync {
    /// Orders the caller placed.
    async fn list_mine(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<Paginated<Order>, Error>;

    /// Orders for the caller's products.
    async fn list_seller_orders(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<Paginated<Order>, Error>;

    /// An order visible to its buyer, seller, or an admin.
    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Order, Error>;

    /// Price a cart against current products.
    async fn price_cart(&self, cart: &Cart) -> Result<CartView, Error>;
}
