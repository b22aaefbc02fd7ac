//! PostgreSQL-backed `PasswordResetRepository` implementation.
//!
//! Only token digests are stored. Redemption marks a token used with a
//! conditional update so a token can be consumed at most once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    PasswordResetRecord, PasswordResetRepository, PasswordResetRepositoryError,
};
use crate::domain::{ResetTokenDigest, UserId};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::models::PasswordResetRow;
use super::pool::DbPool;
use super::schema::password_reset_tokens;

/// Diesel-backed implementation of the password reset repository port.
#[derive(Clone)]
pub struct DieselPasswordResetRepository {
    pool: DbPool,
}

impl DieselPasswordResetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(PasswordResetRepositoryError);

#[async_trait]
impl PasswordResetRepository for DieselPasswordResetRepository {
    async fn insert(&self, record: &PasswordResetRecord) -> Result<(), PasswordResetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(password_reset_tokens::table)
            .values(&PasswordResetRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PasswordResetRecord>, PasswordResetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        password_reset_tokens::table
            .filter(password_reset_tokens::user_id.eq(user_id.as_uuid()))
            .order(password_reset_tokens::created_at.desc())
            .select(PasswordResetRow::as_select())
            .first::<PasswordResetRow>(&mut conn)
            .await
            .optional()
            .map(|row| row.map(PasswordResetRecord::from))
            .map_err(map_diesel_error)
    }

    async fn find_by_digest(
        &self,
        digest: &ResetTokenDigest,
    ) -> Result<Option<PasswordResetRecord>, PasswordResetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        password_reset_tokens::table
            .filter(password_reset_tokens::token_digest.eq(digest.as_str()))
            .select(PasswordResetRow::as_select())
            .first::<PasswordResetRow>(&mut conn)
            .await
            .optional()
            .map(|row| row.map(PasswordResetRecord::from))
            .map_err(map_diesel_error)
    }

    async fn mark_used(
        &self,
        digest: &ResetTokenDigest,
        used_at: DateTime<Utc>,
    ) -> Result<bool, PasswordResetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let unused = password_reset_tokens::table
            .filter(password_reset_tokens::token_digest.eq(digest.as_str()))
            .filter(password_reset_tokens::used_at.is_null());
        let updated = diesel::update(unused)
            .set(password_reset_tokens::used_at.eq(Some(used_at)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
