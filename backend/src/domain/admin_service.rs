//! Administration service: platform statistics, account and vet moderation,
//! product moderation, and platform settings.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use mockable::Clock;
use pagination::{PageParams, Paginated};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::accounts_service::map_user_error;
use crate::domain::marketplace_service::map_product_error;
use crate::domain::ports::{
    AdminCommand, AdminQuery, NotificationSink, PlatformStatsRepository,
    PlatformStatsRepositoryError, ProductRepository, SettingsRepository, SettingsRepositoryError,
    UserRepository, VetRepository,
};
use crate::domain::validation::bounded_text;
use crate::domain::vets_service::map_vet_error;
use crate::domain::{
    Actor, DEFAULT_STATS_DAYS, Error, NewNotification, NotificationType, PlatformSettings,
    PlatformStats, Product, ProductAdminFilter, ProductModeration, RECENT_ACTIVITY_LIMIT,
    REPORT_TOP_LIMIT, ReportWindow, ReportsOverview, User,
    UserAdminFilter, UserAdminUpdate, UserId, VetProfile, VetStatus, invalid_field,
    validate_settings_update,
};

/// Longest window accepted by the statistics endpoint.
pub const MAX_STATS_DAYS: u32 = 365;

pub(crate) fn map_settings_error(error: SettingsRepositoryError) -> Error {
    match error {
        SettingsRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("settings repository unavailable: {message}"))
        }
        SettingsRepositoryError::Query { message } => {
            Error::internal(format!("settings repository error: {message}"))
        }
    }
}

fn map_stats_error(error: PlatformStatsRepositoryError) -> Error {
    match error {
        PlatformStatsRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("stats repository unavailable: {message}"))
        }
        PlatformStatsRepositoryError::Query { message } => {
            Error::internal(format!("stats repository error: {message}"))
        }
    }
}

/// Admin service implementing the admin driving ports.
#[derive(Clone)]
pub struct AdminService<U, V, P> {
    users: Arc<U>,
    vets: Arc<V>,
    products: Arc<P>,
    settings: Arc<dyn SettingsRepository>,
    stats: Arc<dyn PlatformStatsRepository>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

/// Driven ports used by [`AdminService`] that are shared as trait objects.
pub struct AdminPorts {
    pub settings: Arc<dyn SettingsRepository>,
    pub stats: Arc<dyn PlatformStatsRepository>,
    pub notifier: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
}

impl<U, V, P> AdminService<U, V, P> {
    pub fn new(users: Arc<U>, vets: Arc<V>, products: Arc<P>, ports: AdminPorts) -> Self {
        Self {
            users,
            vets,
            products,
            settings: ports.settings,
            stats: ports.stats,
            notifier: ports.notifier,
            clock: ports.clock,
        }
    }
}

impl<U, V, P> AdminService<U, V, P>
where
    U: UserRepository,
    V: VetRepository,
    P: ProductRepository,
{
    async fn load_vet(&self, vet_id: UserId) -> Result<VetProfile, Error> {
        self.vets
            .find_by_user(&vet_id)
            .await
            .map_err(map_vet_error)?
            .ok_or_else(|| Error::not_found(format!("vet {vet_id} not found")))
    }

    async fn review_vet(
        &self,
        mut vet: VetProfile,
        status: VetStatus,
        reason: Option<String>,
    ) -> Result<VetProfile, Error> {
        vet.status = status;
        vet.rejection_reason = reason;
        vet.updated_at = self.clock.utc();
        self.vets.save(&vet).await.map_err(map_vet_error)?;
        info!(vet_id = %vet.user_id, status = status.as_str(), "vet profile reviewed");

        let (title, message) = match (&vet.status, vet.rejection_reason.as_deref()) {
            (VetStatus::Approved, _) => (
                "Vet profile approved",
                "Your clinic is now listed in the vet directory".to_owned(),
            ),
            (_, Some(reason)) => (
                "Vet profile rejected",
                format!("Your vet profile was not approved: {reason}"),
            ),
            _ => (
                "Vet profile update",
                "Your vet profile status changed".to_owned(),
            ),
        };
        self.notifier
            .notify(NewNotification::new(
                vet.user_id,
                NotificationType::Vet,
                title,
                message,
            ))
            .await;
        Ok(vet)
    }

    async fn current_settings(&self) -> Result<PlatformSettings, Error> {
        let stored = self.settings.load().await.map_err(map_settings_error)?;
        Ok(PlatformSettings::from_stored(stored))
    }
}

#[async_trait]
impl<U, V, P> AdminCommand for AdminService<U, V, P>
where
    U: UserRepository,
    V: VetRepository,
    P: ProductRepository,
{
    async fn update_user(
        &self,
        actor: &Actor,
        id: UserId,
        update: UserAdminUpdate,
    ) -> Result<User, Error> {
        actor.require_admin()?;
        if id == actor.user_id {
            if update.is_active == Some(false) {
                return Err(Error::forbidden("admins cannot deactivate their own account"));
            }
            if update.role.is_some_and(|role| role != actor.role) {
                return Err(Error::forbidden("admins cannot change their own role"));
            }
        }
        let mut user = self
            .users
            .find_by_id(&id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        if let Some(active) = update.is_active {
            user.is_active = active;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        self.users
            .update_account(&user)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %id, admin_id = %actor.user_id, is_active = user.is_active, role = %user.role, "account updated by admin");
        Ok(user)
    }

    async fn approve_vet(&self, actor: &Actor, vet_id: UserId) -> Result<VetProfile, Error> {
        actor.require_admin()?;
        let vet = self.load_vet(vet_id).await?;
        self.review_vet(vet, VetStatus::Approved, None).await
    }

    async fn reject_vet(
        &self,
        actor: &Actor,
        vet_id: UserId,
        reason: String,
    ) -> Result<VetProfile, Error> {
        actor.require_admin()?;
        let reason = bounded_text("reason", &reason, 1, 500)?;
        let vet = self.load_vet(vet_id).await?;
        self.review_vet(vet, VetStatus::Rejected, Some(reason)).await
    }

    async fn moderate_product(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: ProductModeration,
    ) -> Result<Product, Error> {
        actor.require_admin()?;
        let mut product = self
            .products
            .find_by_id(&id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))?;
        product.moderate(decision, self.clock.utc())?;
        self.products
            .save(&product)
            .await
            .map_err(map_product_error)?;
        info!(product_id = %id, verified = product.verified, flagged = product.is_flagged, "product moderated");
        Ok(product)
    }

    async fn update_settings(
        &self,
        actor: &Actor,
        updates: BTreeMap<String, String>,
    ) -> Result<PlatformSettings, Error> {
        actor.require_admin()?;
        let values = validate_settings_update(updates)?;
        self.settings
            .save(&values)
            .await
            .map_err(map_settings_error)?;
        info!(admin_id = %actor.user_id, keys = values.len(), "platform settings updated");
        self.current_settings().await
    }
}

#[async_trait]
impl<U, V, P> AdminQuery for AdminService<U, V, P>
where
    U: UserRepository,
    V: VetRepository,
    P: ProductRepository,
{
    async fn stats(&self, actor: &Actor, days: Option<u32>) -> Result<PlatformStats, Error> {
        actor.require_admin()?;
        let days = days.unwrap_or(DEFAULT_STATS_DAYS);
        if !(1..=MAX_STATS_DAYS).contains(&days) {
            return Err(invalid_field(
                "days",
                "out_of_range",
                format!("days must be between 1 and {MAX_STATS_DAYS}"),
                Some(json!(days)),
            ));
        }
        let since = self.clock.utc() - Duration::days(i64::from(days));
        let mut stats = self
            .stats
            .snapshot(since, RECENT_ACTIVITY_LIMIT)
            .await
            .map_err(map_stats_error)?;
        stats.days = days;
        Ok(stats)
    }

    async fn reports_overview(
        &self,
        actor: &Actor,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<ReportsOverview, Error> {
        actor.require_admin()?;
        let window =
            ReportWindow::resolve(from, to, self.clock.utc().date_naive(), MAX_STATS_DAYS)?;
        self.stats
            .reports(window, REPORT_TOP_LIMIT)
            .await
            .map_err(map_stats_error)
    }

    async fn list_users(
        &self,
        actor: &Actor,
        filter: UserAdminFilter,
        page: PageParams,
    ) -> Result<Paginated<User>, Error> {
        actor.require_admin()?;
        let (items, total) = self
            .users
            .list(&filter, page)
            .await
            .map_err(map_user_error)?;
        Ok(Paginated::new(items, total, page))
    }

    async fn list_vets(
        &self,
        actor: &Actor,
        status: Option<VetStatus>,
        page: PageParams,
    ) -> Result<Paginated<VetProfile>, Error> {
        actor.require_admin()?;
        let (items, total) = self
            .vets
            .list_by_status(status, page)
            .await
            .map_err(map_vet_error)?;
        Ok(Paginated::new(items, total, page))
    }

    async fn list_products(
        &self,
        actor: &Actor,
        filter: ProductAdminFilter,
        page: PageParams,
    ) -> Result<Paginated<Product>, Error> {
        actor.require_admin()?;
        let (items, total) = self
            .products
            .list_for_admin(&filter, page)
            .await
            .map_err(map_product_error)?;
        Ok(Paginated::new(items, total, page))
    }

    async fn settings(&self, actor: &Actor) -> Result<PlatformSettings, Error> {
        actor.require_admin()?;
        self.current_settings().await
    }
}

#[cfg(test)]
#[path = "admin_service_tests.rs"]
mod tests;
