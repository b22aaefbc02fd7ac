//! PostgreSQL-backed `CaseRepository` implementation.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CaseRepository, CaseRepositoryError};
use crate::domain::{Case, CaseFilter, CaseScope};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::models::CaseRow;
use super::pool::DbPool;
use super::schema::cases;

/// Diesel-backed implementation of the case repository port.
#[derive(Clone)]
pub struct DieselCaseRepository {
    pool: DbPool,
}

impl DieselCaseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(CaseRepositoryError);

fn scoped(scope: CaseScope, filter: &CaseFilter) -> cases::BoxedQuery<'static, Pg> {
    let mut query = cases::table.into_boxed();
    query = match scope {
        CaseScope::Owner(owner) => query.filter(cases::owner_id.eq(*owner.as_uuid())),
        CaseScope::Vet(vet) => query.filter(cases::vet_id.eq(*vet.as_uuid())),
        CaseScope::All => query,
    };
    if let Some(animal_id) = filter.animal_id {
        query = query.filter(cases::animal_id.eq(animal_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(cases::status.eq(status.as_str()));
    }
    query
}

#[async_trait]
impl CaseRepository for DieselCaseRepository {
    async fn list(&self, scope: CaseScope, filter: &CaseFilter) -> Result<Vec<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CaseRow> = scoped(scope, filter)
            .order((cases::created_at.desc(), cases::id.desc()))
            .select(CaseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| row.into_case().map_err(CaseRepositoryError::query))
            .collect()
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = cases::table
            .filter(cases::id.eq(id))
            .select(CaseRow::as_select())
            .first::<CaseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_case().map_err(CaseRepositoryError::query))
            .transpose()
    }

    async fn save(&self, case: &Case) -> Result<(), CaseRepositoryError> {
        let row = CaseRow::from(case);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(cases::table)
            .values(&row)
            .on_conflict(cases::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
