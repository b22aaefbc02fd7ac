//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Accounts and their profiles live in separate tables; registration writes
//! both in one transaction. Unique violations on the email and phone
//! constraints surface as the port's duplicate variants.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::PageParams;

use crate::domain::ports::{StoredUser, UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, PasswordDigest, User, UserAdminFilter, UserId, UserProfile};

use super::diesel_basic_error_mapping::{repository_error_mappers, unique_violation};
use super::diesel_helpers::{contains_pattern, count_to_u64, page_window};
use super::models::{UserAccountUpdate, UserProfileRow, UserRow};
use super::pool::DbPool;
use super::schema::{user_profiles, users};

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(UserRepositoryError);

/// Like `map_diesel_error`, but report duplicate contact details.
fn map_write_error(error: diesel::result::Error) -> UserRepositoryError {
    match unique_violation(&error) {
        Some("users_email_key") => UserRepositoryError::duplicate_email(),
        Some("users_phone_key") => UserRepositoryError::duplicate_phone(),
        _ => map_diesel_error(error),
    }
}

fn row_to_stored(row: UserRow) -> Result<StoredUser, UserRepositoryError> {
    row.into_stored().map_err(UserRepositoryError::query)
}

fn filtered(filter: &UserAdminFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(role) = filter.role {
        query = query.filter(users::role.eq(role.as_str()));
    }
    if let Some(active) = filter.is_active {
        query = query.filter(users::is_active.eq(active));
    }
    if let Some(needle) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(needle);
        query = query.filter(
            users::name
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern.clone()))
                .or(users::phone.assume_not_null().ilike(pattern)),
        );
    }
    query
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &StoredUser, profile: &UserProfile) -> Result<(), UserRepositoryError> {
        let user_row = UserRow::from_stored(user);
        let profile_row = UserProfileRow::from_profile(&user.user.id, profile, user.user.created_at);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(user_profiles::table)
                    .values(&profile_row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_write_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row_to_stored(row).map(|stored| stored.user))
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<StoredUser>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn update_account(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserAccountUpdate::from_user(user, chrono::Utc::now());
        let updated = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_write_error)?;
        if updated == 0 {
            return Err(UserRepositoryError::query(format!("user {} does not exist", user.id)));
        }
        Ok(())
    }

    async fn find_profile(&self, id: &UserId) -> Result<UserProfile, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = user_profiles::table
            .filter(user_profiles::user_id.eq(id.as_uuid()))
            .select(UserProfileRow::as_select())
            .first::<UserProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(UserProfileRow::into_profile).unwrap_or_default())
    }

    async fn save_profile(&self, id: &UserId, profile: &UserProfile) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserProfileRow::from_profile(id, profile, chrono::Utc::now());
        diesel::insert_into(user_profiles::table)
            .values(&row)
            .on_conflict(user_profiles::user_id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_password(&self, id: &UserId, password: &PasswordDigest) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::password_hash.eq(password.as_str()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        filter: &UserAdminFilter,
        page: PageParams,
    ) -> Result<(Vec<User>, u64), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (offset, limit) = page_window(page);
        let rows: Vec<UserRow> = filtered(filter)
            .order((users::created_at.desc(), users::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let users = rows
            .into_iter()
            .map(|row| row_to_stored(row).map(|stored| stored.user))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((users, count_to_u64(total)))
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage for the user repository.
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct Violation(&'static str);

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[rstest]
    #[case("users_email_key", UserRepositoryError::duplicate_email())]
    #[case("users_phone_key", UserRepositoryError::duplicate_phone())]
    fn unique_constraints_map_to_duplicates(
        #[case] constraint: &'static str,
        #[case] expected: UserRepositoryError,
    ) {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Violation(constraint)),
        );
        assert_eq!(map_write_error(error), expected);
    }

    #[rstest]
    fn other_violations_are_query_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Violation("users_pkey")),
        );
        assert!(matches!(map_write_error(error), UserRepositoryError::Query { .. }));
    }
}
