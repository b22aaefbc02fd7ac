//! Bundle of driven ports handed to the composition root.

use std::sync::Arc;

use super::{
    AnimalRepository, BookingRepository, CaseRepository, NotificationRepository, OrderRepository,
    PasswordResetRepository, PlatformStatsRepository, ProductRepository, SellerProfileRepository,
    SettingsRepository, UserRepository, VetRepository,
};

/// Supplies one adapter per driven port so services can be wired without
/// knowing which backend (in-memory or PostgreSQL) is in use.
///
/// Services are generic over their repositories, so the concrete types are
/// exposed as associated types; the settings and statistics ports are only
/// ever consumed as trait objects.
pub trait RepositoryProvider {
    type Users: UserRepository + 'static;
    type Resets: PasswordResetRepository + 'static;
    type Animals: AnimalRepository + 'static;
    type Cases: CaseRepository + 'static;
    type Vets: VetRepository + 'static;
    type Bookings: BookingRepository + 'static;
    type Products: ProductRepository + 'static;
    type Sellers: SellerProfileRepository + 'static;
    type Orders: OrderRepository + 'static;
    type Notifications: NotificationRepository + 'static;

    fn users(&self) -> Arc<Self::Users>;
    fn resets(&self) -> Arc<Self::Resets>;
    fn animals(&self) -> Arc<Self::Animals>;
    fn cases(&self) -> Arc<Self::Cases>;
    fn vets(&self) -> Arc<Self::Vets>;
    fn bookings(&self) -> Arc<Self::Bookings>;
    fn products(&self) -> Arc<Self::Products>;
    fn sellers(&self) -> Arc<Self::Sellers>;
    fn orders(&self) -> Arc<Self::Orders>;
    fn notifications(&self) -> Arc<Self::Notifications>;
    fn settings(&self) -> Arc<dyn SettingsRepository>;
    fn stats(&self) -> Arc<dyn PlatformStatsRepository>;
}
