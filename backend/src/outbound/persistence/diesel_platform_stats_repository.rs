//! PostgreSQL-backed `PlatformStatsRepository` implementation.
//!
//! Counters are independent `COUNT(*)` queries read on one connection; the
//! snapshot is not transactionally consistent across tables. Reports load the
//! windowed orders and aggregate them in [`ReportsOverview::tally`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PlatformStatsRepository, PlatformStatsRepositoryError};
use crate::domain::{
    BookingStatus, OrderStatus, PlatformStats, ReportOrder, ReportWindow, ReportsOverview, UserId,
    VetStatus,
};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::diesel_helpers::count_to_u64;
use super::models::{BookingRow, OrderItemRow, OrderRow};
use super::pool::DbPool;
use super::schema::{bookings, order_items, orders, products, users, vet_profiles};

/// Diesel-backed implementation of the platform statistics port.
#[derive(Clone)]
pub struct DieselPlatformStatsRepository {
    pool: DbPool,
}

impl DieselPlatformStatsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(PlatformStatsRepositoryError);

/// Run a `COUNT(*)` query and convert the result.
macro_rules! count {
    ($conn:expr, $query:expr) => {
        $query
            .count()
            .get_result::<i64>($conn)
            .await
            .map(count_to_u64)
            .map_err(map_diesel_error)?
    };
}

#[async_trait]
impl PlatformStatsRepository for DieselPlatformStatsRepository {
    async fn snapshot(
        &self,
        revenue_since: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<PlatformStats, PlatformStatsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn = &mut conn;
        let limit = i64::try_from(recent_limit).unwrap_or(i64::MAX);

        let total_users = count!(conn, users::table);
        let active_users = count!(conn, users::table.filter(users::is_active.eq(true)));
        let total_vets = count!(conn, vet_profiles::table);
        let pending_vets = count!(
            conn,
            vet_profiles::table.filter(vet_profiles::status.eq(VetStatus::Pending.as_str()))
        );
        let total_products = count!(conn, products::table);
        let flagged_products = count!(conn, products::table.filter(products::is_flagged.eq(true)));
        let total_bookings = count!(conn, bookings::table);
        let total_orders = count!(conn, orders::table);

        let windowed: Vec<(String, i64)> = orders::table
            .filter(orders::created_at.ge(revenue_since))
            .select((orders::status, orders::total_price))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let revenue = windowed
            .into_iter()
            .filter(|(status, _)| OrderStatus::parse(status).is_some_and(OrderStatus::counts_as_revenue))
            .fold(0_i64, |sum, (_, total)| sum.saturating_add(total));

        let booking_rows: Vec<BookingRow> = bookings::table
            .order((bookings::created_at.desc(), bookings::id.desc()))
            .limit(limit)
            .select(BookingRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let recent_bookings = booking_rows
            .into_iter()
            .map(|row| row.into_booking().map_err(PlatformStatsRepositoryError::query))
            .collect::<Result<Vec<_>, _>>()?;

        let order_rows: Vec<OrderRow> = orders::table
            .order((orders::created_at.desc(), orders::id.desc()))
            .limit(limit)
            .select(OrderRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = order_rows.iter().map(|row| row.id).collect();
        let item_rows: Vec<OrderItemRow> = order_items::table
            .filter(order_items::order_id.eq_any(&ids))
            .select(OrderItemRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let mut grouped = OrderItemRow::group_by_order(item_rows);
        let recent_orders = order_rows
            .into_iter()
            .map(|row| {
                let items = grouped.remove(&row.id).unwrap_or_default();
                row.into_order(items).map_err(PlatformStatsRepositoryError::query)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PlatformStats {
            days: 0,
            total_users,
            active_users,
            total_vets,
            pending_vets,
            total_products,
            flagged_products,
            total_bookings,
            total_orders,
            revenue,
            recent_bookings,
            recent_orders,
        })
    }

    async fn reports(
        &self,
        window: ReportWindow,
        top_limit: usize,
    ) -> Result<ReportsOverview, PlatformStatsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn = &mut conn;

        let order_rows: Vec<(Uuid, Uuid, DateTime<Utc>, i64)> = orders::table
            .filter(orders::created_at.ge(window.starts_at()))
            .filter(orders::created_at.lt(window.ends_before()))
            .select((
                orders::id,
                orders::seller_id,
                orders::created_at,
                orders::total_price,
            ))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let order_ids: Vec<Uuid> = order_rows.iter().map(|row| row.0).collect();
        let lines: Vec<(Uuid, Uuid)> = order_items::table
            .filter(order_items::order_id.eq_any(&order_ids))
            .select((order_items::order_id, order_items::product_id))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let mut products_by_order: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (order_id, product_id) in lines {
            products_by_order.entry(order_id).or_default().push(product_id);
        }
        let orders: Vec<ReportOrder> = order_rows
            .into_iter()
            .map(|(id, seller_id, created_at, total_price)| ReportOrder {
                seller_id: UserId::from_uuid(seller_id),
                created_at,
                total_price,
                product_ids: products_by_order.remove(&id).unwrap_or_default(),
            })
            .collect();

        let mut seller_ids: Vec<Uuid> = orders.iter().map(|o| *o.seller_id.as_uuid()).collect();
        seller_ids.sort_unstable();
        seller_ids.dedup();
        let names: HashMap<Uuid, String> = users::table
            .filter(users::id.eq_any(&seller_ids))
            .select((users::id, users::name))
            .load::<(Uuid, String)>(conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        let mut product_ids: Vec<Uuid> = orders
            .iter()
            .flat_map(|o| o.product_ids.iter().copied())
            .collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let titles: HashMap<Uuid, String> = products::table
            .filter(products::id.eq_any(&product_ids))
            .select((products::id, products::title))
            .load::<(Uuid, String)>(conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        let booking_counts: Vec<(String, i64)> = bookings::table
            .group_by(bookings::status)
            .select((bookings::status, count_star()))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ReportsOverview::tally(
            window,
            &orders,
            booking_counts.into_iter().filter_map(|(status, count)| {
                BookingStatus::parse(&status).map(|status| (status, count_to_u64(count)))
            }),
            |id| names.get(id.as_uuid()).cloned(),
            |id| titles.get(id).cloned(),
            top_limit,
        ))
    }
}
