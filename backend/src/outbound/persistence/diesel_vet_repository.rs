//! PostgreSQL-backed `VetRepository` implementation.
//!
//! The weekly availability schedule is a JSONB column on the profile row. It
//! is read and written separately so profile saves leave it untouched.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageParams;

use crate::domain::ports::{VetRepository, VetRepositoryError};
use crate::domain::{Availability, UserId, VetProfile, VetSearch, VetStatus};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::diesel_helpers::{count_to_u64, page_window};
use super::models::VetProfileRow;
use super::pool::DbPool;
use super::schema::vet_profiles;

/// Diesel-backed implementation of the vet repository port.
#[derive(Clone)]
pub struct DieselVetRepository {
    pool: DbPool,
}

impl DieselVetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(VetRepositoryError);

fn row_to_profile(row: VetProfileRow) -> Result<VetProfile, VetRepositoryError> {
    row.into_profile().map_err(VetRepositoryError::query)
}

fn with_status(status: Option<VetStatus>) -> vet_profiles::BoxedQuery<'static, Pg> {
    let query = vet_profiles::table.into_boxed();
    match status {
        Some(status) => query.filter(vet_profiles::status.eq(status.as_str())),
        None => query,
    }
}

#[async_trait]
impl VetRepository for DieselVetRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<VetProfile>, VetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = vet_profiles::table
            .filter(vet_profiles::user_id.eq(user_id.as_uuid()))
            .select(VetProfileRow::as_select())
            .first::<VetProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_profile).transpose()
    }

    async fn save(&self, profile: &VetProfile) -> Result<(), VetRepositoryError> {
        let row = VetProfileRow::from(profile);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(vet_profiles::table)
            .values(&row)
            .on_conflict(vet_profiles::user_id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn search_approved(&self, search: &VetSearch) -> Result<Vec<VetProfile>, VetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = with_status(Some(VetStatus::Approved));
        if let Some(farm_visits) = search.farm_visits {
            query = query.filter(vet_profiles::farm_visits.eq(farm_visits));
        }
        if let Some(always_open) = search.is_24x7 {
            query = query.filter(vet_profiles::is_24x7.eq(always_open));
        }
        let rows: Vec<VetProfileRow> = query
            .order((vet_profiles::clinic_name.asc(), vet_profiles::user_id.asc()))
            .select(VetProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut matching = Vec::with_capacity(rows.len());
        for row in rows {
            let profile = row_to_profile(row)?;
            if search.matches(&profile) {
                matching.push(profile);
            }
        }
        Ok(matching)
    }

    async fn list_by_status(
        &self,
        status: Option<VetStatus>,
        page: PageParams,
    ) -> Result<(Vec<VetProfile>, u64), VetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = with_status(status)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (offset, limit) = page_window(page);
        let rows: Vec<VetProfileRow> = with_status(status)
            .order((vet_profiles::created_at.desc(), vet_profiles::user_id.desc()))
            .offset(offset)
            .limit(limit)
            .select(VetProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let profiles = rows
            .into_iter()
            .map(row_to_profile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((profiles, count_to_u64(total)))
    }

    async fn find_availability(&self, user_id: &UserId) -> Result<Option<Availability>, VetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let document: Option<Option<serde_json::Value>> = vet_profiles::table
            .filter(vet_profiles::user_id.eq(user_id.as_uuid()))
            .select(vet_profiles::availability)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        document
            .flatten()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|err| VetRepositoryError::query(format!("decode availability: {err}")))
            })
            .transpose()
    }

    async fn save_availability(
        &self,
        user_id: &UserId,
        availability: &Availability,
    ) -> Result<(), VetRepositoryError> {
        let document = serde_json::to_value(availability)
            .map_err(|err| VetRepositoryError::query(format!("encode availability: {err}")))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(vet_profiles::table.filter(vet_profiles::user_id.eq(user_id.as_uuid())))
            .set((
                vet_profiles::availability.eq(Some(document)),
                vet_profiles::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(VetRepositoryError::query(format!("vet profile {user_id} does not exist")));
        }
        Ok(())
    }
}
