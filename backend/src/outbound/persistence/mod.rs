//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the driven repository
//! ports backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Ownership, visibility, and lifecycle
//!   rules live in the domain services.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Atomic stock**: order placement and cancellation lock product rows
//!   and adjust stock inside one transaction.
//! - **Strongly typed errors**: All database errors are mapped to the port
//!   error of the repository that raised them.
//!
//! # Example
//!
//! ```ignore
//! use anilink::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/anilink")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_animal_repository;
mod diesel_basic_error_mapping;
mod diesel_booking_repository;
mod diesel_case_repository;
mod diesel_helpers;
mod diesel_notification_repository;
mod diesel_order_repository;
mod diesel_password_reset_repository;
mod diesel_platform_stats_repository;
mod diesel_product_repository;
mod diesel_seller_profile_repository;
mod diesel_settings_repository;
mod diesel_user_repository;
mod diesel_vet_repository;
mod migrations;
mod models;
mod pool;
mod provider;
mod schema;

pub use diesel_animal_repository::DieselAnimalRepository;
pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_case_repository::DieselCaseRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_password_reset_repository::DieselPasswordResetRepository;
pub use diesel_platform_stats_repository::DieselPlatformStatsRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_seller_profile_repository::DieselSellerProfileRepository;
pub use diesel_settings_repository::DieselSettingsRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vet_repository::DieselVetRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
pub use provider::DieselRepositories;
