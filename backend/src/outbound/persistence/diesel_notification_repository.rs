//! PostgreSQL-backed `NotificationRepository` implementation.
//!
//! The feed is a keyset page over `(created_at, id)` descending; every
//! mutation is scoped to the recipient so one user cannot touch another's
//! inbox.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{FeedQuery, Notification, NotificationPayload, UserId};

use super::diesel_basic_error_mapping::repository_error_mappers;
use super::diesel_helpers::count_to_u64;
use super::models::NotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(NotificationRepositoryError);

fn payload_entity(payload: Option<serde_json::Value>) -> Option<Uuid> {
    payload
        .and_then(|value| serde_json::from_value::<NotificationPayload>(value).ok())
        .map(|payload| payload.entity_id)
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let row = NotificationRow::from_notification(notification)
            .map_err(NotificationRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn insert_once(&self, notification: &Notification) -> Result<bool, NotificationRepositoryError> {
        let row = NotificationRow::from_notification(notification)
            .map_err(NotificationRepositoryError::query)?;
        let user_id = *notification.user_id.as_uuid();
        let entity_id = notification.entity_id();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                // Held until commit; serialises de-duplicating writes per recipient.
                diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
                    .bind::<SqlUuid, _>(user_id)
                    .execute(conn)
                    .await?;
                let payloads: Vec<Option<serde_json::Value>> = notifications::table
                    .filter(notifications::user_id.eq(user_id))
                    .filter(notifications::kind.eq(row.kind.as_str()))
                    .filter(notifications::title.eq(row.title.as_str()))
                    .select(notifications::payload)
                    .load(conn)
                    .await?;
                if payloads
                    .into_iter()
                    .any(|payload| payload_entity(payload) == entity_id)
                {
                    return Ok(false);
                }
                diesel::insert_into(notifications::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn feed(
        &self,
        user_id: &UserId,
        query: FeedQuery,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut select = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .into_boxed();
        if query.unread_only {
            select = select.filter(notifications::read.eq(false));
        }
        if let Some(before) = query.before {
            select = select.filter(
                notifications::created_at.lt(before.created_at).or(notifications::created_at
                    .eq(before.created_at)
                    .and(notifications::id.lt(before.id))),
            );
        }
        let rows: Vec<NotificationRow> = select
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(i64::from(query.limit))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| row.into_notification().map_err(NotificationRepositoryError::query))
            .collect()
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .filter(notifications::read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(count))
    }

    async fn mark_read(&self, user_id: &UserId, id: &Uuid) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owned = notifications::table
            .filter(notifications::id.eq(id))
            .filter(notifications::user_id.eq(user_id.as_uuid()));
        let updated = diesel::update(owned)
            .set(notifications::read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let unread = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .filter(notifications::read.eq(false));
        let updated = diesel::update(unread)
            .set(notifications::read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated as u64)
    }
}
