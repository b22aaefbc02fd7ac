//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are implemented by domain services and
//! called by inbound adapters. Driven ports (`*Repository`, notifiers) are
//! implemented by outbound adapters and called by services.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod admin;
mod animal_repository;
mod animals;
mod booking_repository;
mod bookings;
mod case_repository;
mod cases;
mod marketplace;
mod notification_repository;
mod notifications;
mod order_repository;
mod orders;
mod password_reset_notifier;
mod password_reset_repository;
mod platform_stats_repository;
mod product_repository;
mod repository_provider;
mod seller_profile_repository;
mod settings_repository;
mod user_repository;
mod vet_repository;
mod vets;

#[cfg(test)]
pub use accounts::{MockAccountsCommand, MockAccountsQuery};
pub use accounts::{AccountsCommand, AccountsQuery, ProfileUpdate, RegisterRequest};
#[cfg(test)]
pub use admin::{MockAdminCommand, MockAdminQuery};
pub use admin::{AdminCommand, AdminQuery};
#[cfg(test)]
pub use animal_repository::MockAnimalRepository;
pub use animal_repository::{AnimalRepository, AnimalRepositoryError};
#[cfg(test)]
pub use animals::{MockAnimalsCommand, MockAnimalsQuery};
pub use animals::{AnimalsCommand, AnimalsQuery};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, BookingRepositoryError};
#[cfg(test)]
pub use bookings::{MockBookingsCommand, MockBookingsQuery};
pub use bookings::{BookingsCommand, BookingsQuery};
#[cfg(test)]
pub use case_repository::MockCaseRepository;
pub use case_repository::{CaseRepository, CaseRepositoryError};
#[cfg(test)]
pub use cases::{MockCasesCommand, MockCasesQuery};
pub use cases::{CasesCommand, CasesQuery};
#[cfg(test)]
pub use marketplace::{MockMarketplaceQuery, MockSellerCommand, MockSellerQuery};
pub use marketplace::{MarketplaceQuery, SellerCommand, SellerQuery};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use notifications::{MockNotificationsCommand, MockNotificationsQuery};
pub use notifications::{FeedRequest, NotificationSink, NotificationsCommand, NotificationsQuery};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError, SellerOrderTotals};
#[cfg(test)]
pub use orders::{MockOrdersCommand, MockOrdersQuery};
pub use orders::{CheckoutRequest, OrdersCommand, OrdersQuery};
#[cfg(test)]
pub use password_reset_notifier::MockPasswordResetNotifier;
pub use password_reset_notifier::{PasswordResetNotifier, PasswordResetNotifierError};
#[cfg(test)]
pub use password_reset_repository::MockPasswordResetRepository;
pub use password_reset_repository::{
    PasswordResetRecord, PasswordResetRepository, PasswordResetRepositoryError,
};
#[cfg(test)]
pub use platform_stats_repository::MockPlatformStatsRepository;
pub use platform_stats_repository::{PlatformStatsRepository, PlatformStatsRepositoryError};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductRepository, ProductRepositoryError};

pub use repository_provider::RepositoryProvider;
#[cfg(test)]
pub use seller_profile_repository::MockSellerProfileRepository;
pub use seller_profile_repository::{SellerProfileRepository, SellerProfileRepositoryError};
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
pub use settings_repository::{SettingsRepository, SettingsRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredUser, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use vet_repository::MockVetRepository;
pub use vet_repository::{VetRepository, VetRepositoryError};
#[cfg(test)]
pub use vets::{MockVetsCommand, MockVetsQuery};
pub use vets::{VetsCommand, VetsQuery};
