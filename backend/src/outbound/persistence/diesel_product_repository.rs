//! PostgreSQL-backed `ProductRepository` implementation.
//!
//! Visibility and category narrow the marketplace search in SQL; text and
//! district matching reuse the domain's `ProductSearch::matches` so both
//! adapters agree on semantics.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::ports::{ProductRepository, ProductRepositoryError};
use crate::domain::{Product, ProductAdminFilter, ProductSearch, UserId};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::diesel_helpers::{count_to_u64, page_window};
use super::models::ProductRow;
use super::pool::DbPool;
use super::schema::products;

/// Diesel-backed implementation of the product repository port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(ProductRepositoryError);

fn rows_to_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, ProductRepositoryError> {
    rows.into_iter()
        .map(|row| row.into_product().map_err(ProductRepositoryError::query))
        .collect()
}

fn moderated(filter: &ProductAdminFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.into_boxed();
    if let Some(flagged) = filter.flagged {
        query = query.filter(products::is_flagged.eq(flagged));
    }
    if let Some(verified) = filter.verified {
        query = query.filter(products::verified.eq(verified));
    }
    query
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn search_visible(&self, search: &ProductSearch) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = products::table
            .filter(products::verified.eq(true))
            .filter(products::is_active.eq(true))
            .filter(products::is_flagged.eq(false))
            .into_boxed();
        if let Some(category) = search.category {
            query = query.filter(products::category.eq(category.as_str()));
        }
        let rows: Vec<ProductRow> = query
            .order((products::created_at.desc(), products::id.desc()))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut matching = rows_to_products(rows)?;
        matching.retain(|product| search.matches(product));
        Ok(matching)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_product().map_err(ProductRepositoryError::query))
            .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, ProductRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_products(rows)
    }

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = products::table
            .filter(products::seller_id.eq(seller_id.as_uuid()))
            .order((products::created_at.desc(), products::id.desc()))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_products(rows)
    }

    async fn list_for_admin(
        &self,
        filter: &ProductAdminFilter,
        page: PageParams,
    ) -> Result<(Vec<Product>, u64), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = moderated(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (offset, limit) = page_window(page);
        let rows: Vec<ProductRow> = moderated(filter)
            .order((products::created_at.desc(), products::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok((rows_to_products(rows)?, count_to_u64(total)))
    }

    async fn save(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let row = ProductRow::from(product);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(&row)
            .on_conflict(products::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
