//! PostgreSQL-backed `BookingRepository` implementation.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{Booking, BookingScope, BookingStatus};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::diesel_helpers::{count_to_u64, page_window};
use super::models::BookingRow;
use super::pool::DbPool;
use super::schema::bookings;

/// Diesel-backed implementation of the booking repository port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(BookingRepositoryError);

fn scoped(scope: BookingScope, status: Option<BookingStatus>) -> bookings::BoxedQuery<'static, Pg> {
    let mut query = bookings::table.into_boxed();
    query = match scope {
        BookingScope::Owner(owner) => query.filter(bookings::owner_id.eq(*owner.as_uuid())),
        BookingScope::Vet(vet) => query.filter(bookings::vet_id.eq(*vet.as_uuid())),
        BookingScope::All => query,
    };
    if let Some(status) = status {
        query = query.filter(bookings::status.eq(status.as_str()));
    }
    query
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn list(
        &self,
        scope: BookingScope,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> Result<(Vec<Booking>, u64), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = scoped(scope, status)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (offset, limit) = page_window(page);
        let rows: Vec<BookingRow> = scoped(scope, status)
            .order((bookings::scheduled_at.asc(), bookings::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let bookings = rows
            .into_iter()
            .map(|row| row.into_booking().map_err(BookingRepositoryError::query))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((bookings, count_to_u64(total)))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = bookings::table
            .filter(bookings::id.eq(id))
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_booking().map_err(BookingRepositoryError::query))
            .transpose()
    }

    async fn save(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let row = BookingRow::from(booking);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(bookings::table)
            .values(&row)
            .on_conflict(bookings::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
