//! Port for order persistence and stock reservation.

use async_trait::async_trait;
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::{Order, OrderScope, OrderStatus, StockShortfall, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// A product does not hold enough stock for the order.
        InsufficientStock { product_id: Uuid, available: i32, requested: i32 } =>
            "insufficient stock for product {product_id}: {available} available, {requested} requested",
        /// The stored order no longer has the status the caller loaded.
        StatusChanged { order_id: Uuid, expected: OrderStatus } =>
            "order {order_id} is no longer {expected}",
    }
}

impl OrderRepositoryError {
    /// Shortfall carried by [`OrderRepositoryError::InsufficientStock`].
    pub fn shortfall(&self) -> Option<StockShortfall> {
        match self {
            Self::InsufficientStock {
                product_id,
                available,
                requested,
            } => Some(StockShortfall {
                product_id: *product_id,
                available: *available,
                requested: *requested,
            }),
            _ => None,
        }
    }
}

/// Order counters for the seller dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SellerOrderTotals {
    pub orders_count: u64,
    pub pending_orders_count: u64,
    /// Sum of delivered order totals.
    pub delivered_revenue: i64,
}

/// Port for storing orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Reserve stock for every item and insert the order, atomically.
    ///
    /// Fails with [`OrderRepositoryError::InsufficientStock`] and leaves stock
    /// untouched when any product is short.
    async fn place(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// Store a cancelled order and return its items to stock, atomically.
    ///
    /// Only applies while the stored status still equals `from`; otherwise
    /// fails with [`OrderRepositoryError::StatusChanged`] and leaves stock
    /// untouched.
    async fn cancel(&self, order: &Order, from: OrderStatus) -> Result<(), OrderRepositoryError>;

    /// Store a status change that does not affect stock, guarded by `from`
    /// like [`OrderRepository::cancel`].
    async fn update_status(
        &self,
        order: &Order,
        from: OrderStatus,
    ) -> Result<(), OrderRepositoryError>;

    /// Find an order with its items.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>, OrderRepositoryError>;

    /// Page through orders in `scope`, newest first.
    async fn list(
        &self,
        scope: OrderScope,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<(Vec<Order>, u64), OrderRepositoryError>;

    /// Dashboard counters for a seller.
    async fn seller_totals(&self, seller_id: &UserId) -> Result<SellerOrderTotals, OrderRepositoryError>;
}
