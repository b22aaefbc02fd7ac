//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services that enforce the platform's
//! ownership, visibility, and lifecycle rules. Keep types immutable and
//! document invariants and serialisation contracts (serde) in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Actor — authenticated caller and role checks.
//! - Aggregates for accounts, animals, cases, vets, bookings, the
//!   marketplace, orders, carts, notifications, and administration.
//! - Services implementing the driving ports in [`ports`].

pub mod actor;
pub mod admin;
pub mod animals;
pub mod auth;
pub mod bookings;
pub mod cart;
pub mod cases;
pub mod error;
pub mod geo;
pub mod marketplace;
pub mod notifications;
pub mod orders;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;
pub mod vets;

mod accounts_service;
mod admin_service;
mod animals_service;
mod bookings_service;
mod cases_service;
mod marketplace_service;
mod notifications_service;
mod orders_service;
mod vets_service;

#[cfg(test)]
mod test_support;

pub use self::accounts_service::{AccountsService, ResetPolicy};
pub use self::actor::Actor;
pub use self::admin::{
    DEFAULT_REPORT_DAYS, DEFAULT_STATS_DAYS, OrdersByDay, PlatformSettings, PlatformStats,
    RECENT_ACTIVITY_LIMIT, REPORT_TOP_LIMIT, ReportOrder, ReportWindow, ReportsOverview,
    SettingKey, TopProduct, TopSeller, UserAdminFilter, UserAdminUpdate,
    validate_settings_update,
};
pub use self::admin_service::{AdminPorts, AdminService, MAX_STATS_DAYS};
pub use self::animals::{
    Animal, AnimalFilter, AnimalPatch, AnimalSex, NewAnimal, NewTreatment, NewVaccination,
    TreatmentRecord, VaccinationRecord,
};
pub use self::animals_service::AnimalsService;
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, Password,
    PasswordDigest, PasswordHashError, RESET_TOKEN_BYTES, ResetToken, ResetTokenDigest,
};
pub use self::bookings::{Booking, BookingScope, BookingStatus, NewBooking, VisitType};
pub use self::bookings_service::BookingsService;
pub use self::cart::{Cart, CartDecodeError, CartLine, CartLineView, CartView, MAX_CART_LINES};
pub use self::cases::{Case, CaseFilter, CaseScope, CaseStatus, NewCase, SymptomsInput, Transition};
pub use self::cases_service::CasesService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{EARTH_RADIUS_KM, GeoError, GeoPoint, ProximityFilter, haversine_km, rank_by_distance};
pub use self::marketplace::{
    CURRENCY, NewProduct, Product, ProductAdminFilter, ProductCategory, ProductListing,
    ProductModeration, ProductPatch, ProductSearch, SellerDashboard, SellerProfile,
    SellerProfileInput,
};
pub use self::marketplace_service::MarketplaceService;
pub use self::notifications::{
    FEED_DEFAULT_LIMIT, FEED_MAX_LIMIT, FeedKey, FeedQuery, NewNotification, Notification,
    NotificationFeed, NotificationPayload, NotificationType,
};
pub use self::notifications_service::{NotificationDispatcher, NotificationsService};
pub use self::orders::{
    DeliveryOption, MAX_LINE_QTY, Order, OrderItem, OrderLine, OrderRequest, OrderScope,
    OrderStatus, StockShortfall, merge_lines,
};
pub use self::orders_service::OrdersService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, NAME_MAX, NAME_MIN, PersonName, PhoneNumber, Role, User, UserId, UserProfile,
    UserValidationError, UserWithProfile,
};
pub use self::validation::{bounded_text, invalid_field, optional_text};
pub use self::vets::{
    Availability, TimeSlot, VetListing, VetProfile, VetProfileInput, VetSearch, VetStatus,
    Weekday,
};
pub use self::vets_service::VetsService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use anilink::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
