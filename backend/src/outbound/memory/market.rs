//! Products, seller storefronts, and orders with stock reservation.

use async_trait::async_trait;
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::ports::{
    OrderRepository, OrderRepositoryError, ProductRepository, ProductRepositoryError,
    SellerOrderTotals, SellerProfileRepository, SellerProfileRepositoryError,
};
use crate::domain::{
    Order, OrderScope, OrderStatus, Product, ProductAdminFilter, ProductSearch, SellerProfile,
    UserId,
};

use super::{InMemoryStore, paged};

fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn search_visible(&self, search: &ProductSearch) -> Result<Vec<Product>, ProductRepositoryError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| product.is_visible() && search.matches(product))
            .cloned()
            .collect();
        newest_first(&mut products);
        Ok(products)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(self.state.read().await.products.get(id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, ProductRepositoryError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id))
            .cloned()
            .collect())
    }

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Product>, ProductRepositoryError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| product.seller_id == *seller_id)
            .cloned()
            .collect();
        newest_first(&mut products);
        Ok(products)
    }

    async fn list_for_admin(
        &self,
        filter: &ProductAdminFilter,
        page: PageParams,
    ) -> Result<(Vec<Product>, u64), ProductRepositoryError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        newest_first(&mut products);
        Ok(paged(products, page))
    }

    async fn save(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let mut state = self.state.write().await;
        state.products.insert(product.id, product.clone());
        Ok(())
    }
}

#[async_trait]
impl SellerProfileRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<SellerProfile>, SellerProfileRepositoryError> {
        Ok(self.state.read().await.sellers.get(user_id).cloned())
    }

    async fn save(&self, profile: &SellerProfile) -> Result<(), SellerProfileRepositoryError> {
        let mut state = self.state.write().await;
        state.sellers.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn place(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut state = self.state.write().await;
        for item in &order.items {
            let available = state
                .products
                .get(&item.product_id)
                .map_or(0, |product| product.stock_qty);
            if available < item.qty {
                return Err(OrderRepositoryError::insufficient_stock(
                    item.product_id,
                    available,
                    item.qty,
                ));
            }
        }
        for item in &order.items {
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.stock_qty -= item.qty;
                product.updated_at = order.created_at;
            }
        }
        state.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn cancel(&self, order: &Order, from: OrderStatus) -> Result<(), OrderRepositoryError> {
        let mut state = self.state.write().await;
        let stored = state.orders.get(&order.id).map(|stored| stored.status);
        if stored != Some(from) {
            return Err(OrderRepositoryError::status_changed(order.id, from));
        }
        for item in &order.items {
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.stock_qty = product.stock_qty.saturating_add(item.qty);
                product.updated_at = order.updated_at;
            }
        }
        state.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        order: &Order,
        from: OrderStatus,
    ) -> Result<(), OrderRepositoryError> {
        let mut state = self.state.write().await;
        let stored = state
            .orders
            .get_mut(&order.id)
            .filter(|stored| stored.status == from)
            .ok_or_else(|| OrderRepositoryError::status_changed(order.id, from))?;
        stored.status = order.status;
        stored.updated_at = order.updated_at;
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self.state.read().await.orders.get(id).cloned())
    }

    async fn list(
        &self,
        scope: OrderScope,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<(Vec<Order>, u64), OrderRepositoryError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| match scope {
                OrderScope::Buyer(buyer) => order.buyer_id == buyer,
                OrderScope::Seller(seller) => order.seller_id == seller,
                OrderScope::All => true,
            })
            .filter(|order| status.is_none_or(|wanted| order.status == wanted))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paged(orders, page))
    }

    async fn seller_totals(&self, seller_id: &UserId) -> Result<SellerOrderTotals, OrderRepositoryError> {
        let state = self.state.read().await;
        let totals = state
            .orders
            .values()
            .filter(|order| order.seller_id == *seller_id)
            .fold(SellerOrderTotals::default(), |mut totals, order| {
                totals.orders_count += 1;
                match order.status {
                    OrderStatus::Pending => totals.pending_orders_count += 1,
                    OrderStatus::Delivered => {
                        totals.delivered_revenue =
                            totals.delivered_revenue.saturating_add(order.total_price);
                    }
                    _ => {}
                }
                totals
            });
        Ok(totals)
    }
}
