//! Driving ports for platform administration.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use pagination::{PageParams, Paginated};
use uuid::Uuid;

use crate::domain::{
    Actor, Error, PlatformSettings, PlatformStats, Product, ProductAdminFilter,
    ProductModeration, ReportsOverview, User, UserAdminFilter, UserAdminUpdate, UserId, VetProfile, VetStatus,
};

/// Admin mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminCommand: Send + Sync {
    async fn update_user(&self, actor: &Actor, id: UserId, update: UserAdminUpdate) -> Result<User, Error>;
    async fn approve_vet(&self, actor: &Actor, vet_id: UserId) -> Result<VetProfile, Error>;
    async fn reject_vet(&self, actor: &Actor, vet_id: UserId, reason: String) -> Result<VetProfile, Error>;
    async fn moderate_product(&self, actor: &Actor, id: Uuid, decision: ProductModeration) -> Result<Product, Error>;
    async fn update_settings(&self, actor: &Actor, updates: BTreeMap<String, String>) -> Result<PlatformSettings, Error>;
}

/// Admin reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminQuery: Send + Sync {
    async fn stats(&self, actor: &Actor, days: Option<u32>) -> Result<PlatformStats, Error>;
    async fn reports_overview(
        &self,
        actor: &Actor,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<ReportsOverview, Error>;
    async fn list_users(&self, actor: &Actor, filter: UserAdminFilter, page: PageParams) -> Result<Paginated<User>, Error>;
    async fn list_vets(&self, actor: &Actor, status: Option<VetStatus>, page: PageParams) -> Result<Paginated<VetProfile>, Error>;
    async fn list_products(&self, actor: &Actor, filter: ProductAdminFilter, page: PageParams) -> Result<Paginated<Product>, Error>;
    async fn settings(&self, actor: &Actor) -> Result<PlatformSettings, Error>;
}
