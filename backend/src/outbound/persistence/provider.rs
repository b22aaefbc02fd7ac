//! PostgreSQL-backed [`RepositoryProvider`].

use std::sync::Arc;

use crate::domain::ports::{PlatformStatsRepository, RepositoryProvider, SettingsRepository};

use super::{
    DbPool, DieselAnimalRepository, DieselBookingRepository, DieselCaseRepository,
    DieselNotificationRepository, DieselOrderRepository, DieselPasswordResetRepository,
    DieselPlatformStatsRepository, DieselProductRepository, DieselSellerProfileRepository,
    DieselSettingsRepository, DieselUserRepository, DieselVetRepository,
};

/// Hands out Diesel repositories sharing one connection pool.
#[derive(Clone)]
pub struct DieselRepositories {
    pool: DbPool,
}

impl DieselRepositories {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RepositoryProvider for DieselRepositories {
    type Users = DieselUserRepository;
    type Resets = DieselPasswordResetRepository;
    type Animals = DieselAnimalRepository;
    type Cases = DieselCaseRepository;
    type Vets = DieselVetRepository;
    type Bookings = DieselBookingRepository;
    type Products = DieselProductRepository;
    type Sellers = DieselSellerProfileRepository;
    type Orders = DieselOrderRepository;
    type Notifications = DieselNotificationRepository;

    fn users(&self) -> Arc<Self::Users> {
        Arc::new(DieselUserRepository::new(self.pool.clone()))
    }

    fn resets(&self) -> Arc<Self::Resets> {
        Arc::new(DieselPasswordResetRepository::new(self.pool.clone()))
    }

    fn animals(&self) -> Arc<Self::Animals> {
        Arc::new(DieselAnimalRepository::new(self.pool.clone()))
    }

    fn cases(&self) -> Arc<Self::Cases> {
        Arc::new(DieselCaseRepository::new(self.pool.clone()))
    }

    fn vets(&self) -> Arc<Self::Vets> {
        Arc::new(DieselVetRepository::new(self.pool.clone()))
    }

    fn bookings(&self) -> Arc<Self::Bookings> {
        Arc::new(DieselBookingRepository::new(self.pool.clone()))
    }

    fn products(&self) -> Arc<Self::Products> {
        Arc::new(DieselProductRepository::new(self.pool.clone()))
    }

    fn sellers(&self) -> Arc<Self::Sellers> {
        Arc::new(DieselSellerProfileRepository::new(self.pool.clone()))
    }

    fn orders(&self) -> Arc<Self::Orders> {
        Arc::new(DieselOrderRepository::new(self.pool.clone()))
    }

    fn notifications(&self) -> Arc<Self::Notifications> {
        Arc::new(DieselNotificationRepository::new(self.pool.clone()))
    }

    fn settings(&self) -> Arc<dyn SettingsRepository> {
        Arc::new(DieselSettingsRepository::new(self.pool.clone()))
    }

    fn stats(&self) -> Arc<dyn PlatformStatsRepository> {
        Arc::new(DieselPlatformStatsRepository::new(self.pool.clone()))
    }
}
