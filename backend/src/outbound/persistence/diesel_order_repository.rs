//! PostgreSQL-backed `OrderRepository` implementation.
//!
//! Placement and cancellation run in a single transaction. Product rows are
//! locked in id order before stock is checked so concurrent checkouts of the
//! same products serialise instead of overselling.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::ports::{OrderRepository, OrderRepositoryError, SellerOrderTotals};
use crate::domain::{Order, OrderScope, OrderStatus, StockShortfall, UserId};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::diesel_helpers::{count_to_u64, page_window};
use super::models::{OrderItemRow, OrderRow};
use super::pool::DbPool;
use super::schema::{order_items, orders, products};

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(OrderRepositoryError);

/// Failure inside the placement transaction.
#[derive(Debug)]
enum PlacementError {
    Diesel(diesel::result::Error),
    Short(StockShortfall),
}

impl From<diesel::result::Error> for PlacementError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn scoped(scope: OrderScope, status: Option<OrderStatus>) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    query = match scope {
        OrderScope::Buyer(buyer) => query.filter(orders::buyer_id.eq(*buyer.as_uuid())),
        OrderScope::Seller(seller) => query.filter(orders::seller_id.eq(*seller.as_uuid())),
        OrderScope::All => query,
    };
    if let Some(status) = status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

/// Load item rows for `rows` and assemble full orders, preserving row order.
async fn attach_items(
    conn: &mut AsyncPgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, OrderRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let item_rows: Vec<OrderItemRow> = order_items::table
        .filter(order_items::order_id.eq_any(&ids))
        .select(OrderItemRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut grouped = OrderItemRow::group_by_order(item_rows);
    rows.into_iter()
        .map(|row| {
            let items = grouped.remove(&row.id).unwrap_or_default();
            row.into_order(items).map_err(OrderRepositoryError::query)
        })
        .collect()
}

async fn restore_stock(
    conn: &mut AsyncPgConnection,
    order: &Order,
) -> Result<(), diesel::result::Error> {
    for item in &order.items {
        diesel::update(products::table.filter(products::id.eq(item.product_id)))
            .set((
                products::stock_qty.eq(products::stock_qty + item.qty),
                products::updated_at.eq(order.updated_at),
            ))
            .execute(conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let (order_row, item_rows) = OrderRow::split(order);
        let mut product_ids: Vec<Uuid> = order.items.iter().map(|item| item.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction(|conn| {
                async move {
                    let stock: HashMap<Uuid, i32> = products::table
                        .filter(products::id.eq_any(&product_ids))
                        .order(products::id.asc())
                        .select((products::id, products::stock_qty))
                        .for_update()
                        .load::<(Uuid, i32)>(conn)
                        .await?
                        .into_iter()
                        .collect();

                    for item in &order.items {
                        let available = stock.get(&item.product_id).copied().unwrap_or(0);
                        if available < item.qty {
                            return Err(PlacementError::Short(StockShortfall {
                                product_id: item.product_id,
                                available,
                                requested: item.qty,
                            }));
                        }
                    }

                    for item in &order.items {
                        diesel::update(products::table.filter(products::id.eq(item.product_id)))
                            .set((
                                products::stock_qty.eq(products::stock_qty - item.qty),
                                products::updated_at.eq(order.created_at),
                            ))
                            .execute(conn)
                            .await?;
                    }

                    diesel::insert_into(orders::table)
                        .values(&order_row)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(order_items::table)
                        .values(&item_rows)
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        result.map_err(|error| match error {
            PlacementError::Diesel(error) => map_diesel_error(error),
            PlacementError::Short(shortfall) => OrderRepositoryError::insufficient_stock(
                shortfall.product_id,
                shortfall.available,
                shortfall.requested,
            ),
        })
    }

    async fn cancel(&self, order: &Order, from: OrderStatus) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cancelled = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(
                        orders::table
                            .filter(orders::id.eq(order.id))
                            .filter(orders::status.eq(from.as_str())),
                    )
                    .set((
                        orders::status.eq(OrderStatus::Cancelled.as_str()),
                        orders::updated_at.eq(order.updated_at),
                    ))
                    .execute(conn)
                    .await?;
                    if updated == 1 {
                        restore_stock(conn, order).await?;
                    }
                    Ok::<_, diesel::result::Error>(updated == 1)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if !cancelled {
            return Err(OrderRepositoryError::status_changed(order.id, from));
        }
        Ok(())
    }

    async fn update_status(
        &self,
        order: &Order,
        from: OrderStatus,
    ) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            orders::table
                .filter(orders::id.eq(order.id))
                .filter(orders::status.eq(from.as_str())),
        )
        .set((
            orders::status.eq(order.status.as_str()),
            orders::updated_at.eq(order.updated_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(OrderRepositoryError::status_changed(order.id, from));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(attach_items(&mut conn, vec![row]).await?.pop())
    }

    async fn list(
        &self,
        scope: OrderScope,
        status: Option<OrderStatus>,
        page: PageParams,
    ) -> Result<(Vec<Order>, u64), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = scoped(scope, status)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (offset, limit) = page_window(page);
        let rows: Vec<OrderRow> = scoped(scope, status)
            .order((orders::created_at.desc(), orders::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let orders = attach_items(&mut conn, rows).await?;
        Ok((orders, count_to_u64(total)))
    }

    async fn seller_totals(&self, seller_id: &UserId) -> Result<SellerOrderTotals, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i64)> = orders::table
            .filter(orders::seller_id.eq(seller_id.as_uuid()))
            .select((orders::status, orders::total_price))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let pending = OrderStatus::Pending.as_str();
        let delivered = OrderStatus::Delivered.as_str();
        Ok(rows.into_iter().fold(
            SellerOrderTotals::default(),
            |mut totals, (status, total_price)| {
                totals.orders_count += 1;
                if status == pending {
                    totals.pending_orders_count += 1;
                } else if status == delivered {
                    totals.delivered_revenue = totals.delivered_revenue.saturating_add(total_price);
                }
                totals
            },
        ))
    }
}
