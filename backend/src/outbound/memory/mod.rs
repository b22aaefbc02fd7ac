//! In-memory adapters implementing every driven port.
//!
//! The store keeps all aggregates behind a single async lock so multi-row
//! operations (placing an order and reserving stock, cancelling and
//! restocking) are atomic, matching the transactional guarantees of the
//! PostgreSQL adapters. The server falls back to this store when no database
//! is configured; integration tests use it throughout.
//!
//! # Example
//!
//! ```ignore
//! use anilink::outbound::memory::InMemoryStore;
//!
//! let store = InMemoryStore::default();
//! let users = std::sync::Arc::new(store.clone());
//! ```

mod accounts;
mod care;
mod market;
mod platform;

use std::collections::HashMap;
use std::sync::Arc;

use pagination::PageParams;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{
    PasswordResetRecord, PlatformStatsRepository, RepositoryProvider, SettingsRepository,
    StoredUser,
};
use crate::domain::{
    Animal, Availability, Booking, Case, Notification, Order, Product, SellerProfile, UserId,
    UserProfile, VetProfile,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, StoredUser>,
    profiles: HashMap<UserId, UserProfile>,
    resets: Vec<PasswordResetRecord>,
    animals: HashMap<Uuid, Animal>,
    cases: HashMap<Uuid, Case>,
    vets: HashMap<UserId, VetProfile>,
    availability: HashMap<UserId, Availability>,
    bookings: HashMap<Uuid, Booking>,
    products: HashMap<Uuid, Product>,
    sellers: HashMap<UserId, SellerProfile>,
    orders: HashMap<Uuid, Order>,
    notifications: Vec<Notification>,
    settings: HashMap<String, String>,
}

/// Shared in-memory store. Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Every port is served by a handle to the same shared state.
impl RepositoryProvider for InMemoryStore {
    type Users = Self;
    type Resets = Self;
    type Animals = Self;
    type Cases = Self;
    type Vets = Self;
    type Bookings = Self;
    type Products = Self;
    type Sellers = Self;
    type Orders = Self;
    type Notifications = Self;

    fn users(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn resets(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn animals(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn cases(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn vets(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn bookings(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn products(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn sellers(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn orders(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn notifications(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    fn settings(&self) -> Arc<dyn SettingsRepository> {
        Arc::new(self.clone())
    }

    fn stats(&self) -> Arc<dyn PlatformStatsRepository> {
        Arc::new(self.clone())
    }
}

/// Apply `page` to an already filtered and ordered collection, returning the
/// page together with the unpaged total.
fn paged<T>(items: Vec<T>, page: PageParams) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    (page.slice(items), total)
}
