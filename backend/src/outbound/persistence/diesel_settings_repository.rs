//! PostgreSQL-backed `SettingsRepository` implementation.
//!
//! Settings are stored as string key/value pairs; interpretation and
//! defaults belong to the domain.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::SettingKey;
use crate::domain::ports::{SettingsRepository, SettingsRepositoryError};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::pool::DbPool;
use super::schema::platform_settings;

/// Diesel-backed implementation of the settings repository port.
#[derive(Clone)]
pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(SettingsRepositoryError);

#[async_trait]
impl SettingsRepository for DieselSettingsRepository {
    async fn load(&self) -> Result<Vec<(String, String)>, SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        platform_settings::table
            .select((platform_settings::key, platform_settings::value))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn save(&self, values: &[(SettingKey, String)]) -> Result<(), SettingsRepositoryError> {
        if values.is_empty() {
            return Ok(());
        }
        let rows: Vec<_> = values
            .iter()
            .map(|(key, value)| {
                (
                    platform_settings::key.eq(key.as_str()),
                    platform_settings::value.eq(value.as_str()),
                )
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(platform_settings::table)
            .values(&rows)
            .on_conflict(platform_settings::key)
            .do_update()
            .set((
                platform_settings::value.eq(excluded(platform_settings::value)),
                platform_settings::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
