//! Order service: placement with stock reservation, fulfilment, cancellation,
//! and session cart checkout.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::marketplace_service::map_product_error;
use crate::domain::ports::{
    CheckoutRequest, NotificationSink, OrderRepository, OrderRepositoryError, OrdersCommand,
    OrdersQuery, ProductRepository,
};
use crate::domain::{
    Actor, Cart, CartView, Error, NewNotification, NotificationPayload, NotificationType, Order,
    OrderRequest, OrderScope, OrderStatus, Role, UserId, invalid_field, merge_lines,
};

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    if let Some(shortfall) = error.shortfall() {
        return shortfall.into_error();
    }
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::StatusChanged { order_id, .. } => Error::conflict(format!(
            "order {order_id} was updated by another request; reload and try again"
        )),
        other => Error::internal(format!("order repository error: {other}")),
    }
}

fn order_notification(user_id: UserId, order: &Order, title: &str, message: String) -> NewNotification {
    NewNotification::new(user_id, NotificationType::Order, title, message)
        .with_payload(NotificationPayload::for_entity("order", "orders", order.id))
}

fn short_id(order: &Order) -> String {
    order.id.simple().to_string().chars().take(8).collect()
}

const BUYER_ROLES: &[Role] = &[Role::Owner, Role::Seller];

/// Order service implementing the orders driving ports.
#[derive(Clone)]
pub struct OrdersService<O, P> {
    orders: Arc<O>,
    products: Arc<P>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl<O, P> OrdersService<O, P> {
    pub fn new(
        orders: Arc<O>,
        products: Arc<P>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            products,
            notifier,
            clock,
        }
    }
}

impl<O, P> OrdersService<O, P>
where
    O: OrderRepository,
    P: ProductRepository,
{
    async fn load(&self, id: Uuid) -> Result<Order, Error> {
        self.orders
            .find_by_id(&id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))
    }

    /// Price and store an order without notifying anyone.
    async fn reserve(&self, buyer: UserId, request: &OrderRequest) -> Result<Order, Error> {
        let lines = merge_lines(&request.items)?;
        let ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
        let products = self
            .products
            .find_many(&ids)
            .await
            .map_err(map_product_error)?;
        let order = Order::draft(buyer, request, &lines, &products, self.clock.utc())?;
        self.orders.place(&order).await.map_err(map_order_error)?;
        info!(order_id = %order.id, seller_id = %order.seller_id, total = order.total_price, "order placed");
        Ok(order)
    }

    async fn announce(&self, order: &Order) {
        let message = format!(
            "Order {} for UGX {} is waiting for confirmation",
            short_id(order),
            order.total_price
        );
        self.notifier
            .notify(order_notification(order.seller_id, order, "New order", message))
            .await;
    }

    async fn release(&self, mut order: Order) -> Result<Order, Error> {
        let from = order.status;
        order.cancel(self.clock.utc())?;
        self.orders
            .cancel(&order, from)
            .await
            .map_err(map_order_error)?;
        info!(order_id = %order.id, "order cancelled and stock restored");
        Ok(order)
    }

    async fn cancel_as(&self, actor: &Actor, order: Order) -> Result<Order, Error> {
        let order = self.release(order).await?;
        let recipient = if actor.user_id == order.buyer_id {
            order.seller_id
        } else {
            order.buyer_id
        };
        let message = format!("Order {} was cancelled", short_id(&order));
        self.notifier
            .notify(order_notification(recipient, &order, "Order cancelled", message))
            .await;
        Ok(order)
    }

    async fn page(
        &self,
        scope: OrderScope,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<Paginated<Order>, Error> {
        let (items, total) = self
            .orders
            .list(scope, status, page)
            .await
            .map_err(map_order_error)?;
        Ok(Paginated::new(items, total, page))
    }
}

#[async_trait]
impl<O, P> OrdersCommand for OrdersService<O, P>
where
    O: OrderRepository,
    P: ProductRepository,
{
    async fn place(&self, actor: &Actor, request: OrderRequest) -> Result<Order, Error> {
        actor.require_any(BUYER_ROLES)?;
        let order = self.reserve(actor.user_id, &request).await?;
        self.announce(&order).await;
        Ok(order)
    }

    async fn cancel(&self, actor: &Actor, id: Uuid) -> Result<Order, Error> {
        let order = self.load(id).await?;
        if !order.involves(actor.user_id) {
            return Err(Error::forbidden("only the buyer or seller may cancel this order"));
        }
        self.cancel_as(actor, order).await
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, Error> {
        actor.require_seller()?;
        let mut order = self.load(id).await?;
        if order.seller_id != actor.user_id {
            return Err(Error::forbidden("only the seller may update this order"));
        }
        if status == OrderStatus::Cancelled {
            return self.cancel_as(actor, order).await;
        }

        let from = order.status;
        order.advance(status, self.clock.utc())?;
        self.orders
            .update_status(&order, from)
            .await
            .map_err(map_order_error)?;
        info!(order_id = %order.id, status = status.as_str(), "order status changed");
        let message = format!("Order {} is now {}", short_id(&order), status.as_str());
        self.notifier
            .notify(order_notification(order.buyer_id, &order, "Order update", message))
            .await;
        Ok(order)
    }

    async fn checkout(
        &self,
        actor: &Actor,
        cart: Cart,
        request: CheckoutRequest,
    ) -> Result<Vec<Order>, Error> {
        actor.require_any(BUYER_ROLES)?;
        if cart.is_empty() {
            return Err(invalid_field("cart", "empty", "your cart is empty", None));
        }
        let view = self.price_cart(&cart).await?;
        if !view.unavailable.is_empty() {
            let ids: Vec<Uuid> = view.unavailable.iter().map(|line| line.product_id).collect();
            return Err(invalid_field(
                "cart",
                "unavailable",
                "some products in your cart are no longer available",
                Some(json!(ids)),
            ));
        }

        let mut placed: Vec<Order> = Vec::new();
        for (_, items) in view.group_by_seller() {
            let order_request = OrderRequest {
                items,
                delivery_option: request.delivery_option,
                delivery_district: request.delivery_district.clone(),
                delivery_address: request.delivery_address.clone(),
            };
            match self.reserve(actor.user_id, &order_request).await {
                Ok(order) => placed.push(order),
                Err(error) => {
                    for order in placed {
                        let order_id = order.id;
                        if let Err(rollback) = self.release(order).await {
                            warn!(%order_id, error = %rollback, "checkout rollback failed to cancel order");
                        }
                    }
                    return Err(error);
                }
            }
        }

        for order in &placed {
            self.announce(order).await;
        }
        Ok(placed)
    }
}

#[async_trait]
impl<O, P> OrdersQuery for OrdersService<O, P>
where
    O: OrderRepository,
    P: ProductRepository,
{
    async fn list_mine(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<Paginated<Order>, Error> {
        actor.require_any(BUYER_ROLES)?;
        self.page(OrderScope::Buyer(actor.user_id), status, page).await
    }

    async fn list_seller_orders(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<Paginated<Order>, Error> {
        actor.require_seller()?;
        self.page(OrderScope::Seller(actor.user_id), status, page).await
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Order, Error> {
        let order = self.load(id).await?;
        if !order.involves(actor.user_id) && !actor.is_admin() {
            return Err(Error::forbidden("not authorised to view this order"));
        }
        Ok(order)
    }

    async fn price_cart(&self, cart: &Cart) -> Result<CartView, Error> {
        let ids: Vec<Uuid> = cart.lines().iter().map(|line| line.product_id).collect();
        if ids.is_empty() {
            return Ok(cart.resolve(&[]));
        }
        let products = self
            .products
            .find_many(&ids)
            .await
            .map_err(map_product_error)?;
        Ok(cart.resolve(&products))
    }
}

#[cfg(test)]
#[path = "orders_service_tests.rs"]
mod tests;
