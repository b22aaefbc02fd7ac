//! PostgreSQL-backed `AnimalRepository` implementation.
//!
//! Vaccination and treatment histories are stored as JSONB documents on the
//! animal row. Deleting an animal detaches it from its cases through the
//! `ON DELETE SET NULL` foreign key.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AnimalRepository, AnimalRepositoryError};
use crate::domain::{Animal, AnimalFilter, UserId};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::models::AnimalRow;
use super::pool::DbPool;
use super::schema::animals;

/// Diesel-backed implementation of the animal repository port.
#[derive(Clone)]
pub struct DieselAnimalRepository {
    pool: DbPool,
}

impl DieselAnimalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(AnimalRepositoryError);

fn row_to_animal(row: AnimalRow) -> Result<Animal, AnimalRepositoryError> {
    row.into_animal().map_err(AnimalRepositoryError::query)
}

#[async_trait]
impl AnimalRepository for DieselAnimalRepository {
    async fn list_for_owner(
        &self,
        owner_id: &UserId,
        filter: &AnimalFilter,
    ) -> Result<Vec<Animal>, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AnimalRow> = animals::table
            .filter(animals::owner_id.eq(owner_id.as_uuid()))
            .order((animals::created_at.desc(), animals::id.desc()))
            .select(AnimalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // Species and text filters are matched in process.
        let mut matching = Vec::with_capacity(rows.len());
        for row in rows {
            let animal = row_to_animal(row)?;
            if filter.matches(&animal) {
                matching.push(animal);
            }
        }
        Ok(matching)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Animal>, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = animals::table
            .filter(animals::id.eq(id))
            .select(AnimalRow::as_select())
            .first::<AnimalRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_animal).transpose()
    }

    async fn save(&self, animal: &Animal) -> Result<(), AnimalRepositoryError> {
        let row = AnimalRow::from_animal(animal).map_err(AnimalRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(animals::table)
            .values(&row)
            .on_conflict(animals::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(animals::table.filter(animals::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
