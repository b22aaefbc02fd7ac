//! PostgreSQL-backed `SellerProfileRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SellerProfileRepository, SellerProfileRepositoryError};
use crate::domain::{SellerProfile, UserId};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::models::SellerProfileRow;
use super::pool::DbPool;
use super::schema::seller_profiles;

/// Diesel-backed implementation of the seller profile repository port.
#[derive(Clone)]
pub struct DieselSellerProfileRepository {
    pool: DbPool,
}

impl DieselSellerProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(SellerProfileRepositoryError);

#[async_trait]
impl SellerProfileRepository for DieselSellerProfileRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SellerProfile>, SellerProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = seller_profiles::table
            .filter(seller_profiles::user_id.eq(user_id.as_uuid()))
            .select(SellerProfileRow::as_select())
            .first::<SellerProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_profile().map_err(SellerProfileRepositoryError::query))
            .transpose()
    }

    async fn save(&self, profile: &SellerProfile) -> Result<(), SellerProfileRepositoryError> {
        let row = SellerProfileRow::from(profile);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(seller_profiles::table)
            .values(&row)
            .on_conflict(seller_profiles::user_id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
