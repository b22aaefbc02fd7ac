//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every handler annotated with `#[utoipa::path]`. Schemas
//! are collected from the request and response bodies those annotations
//! reference, so domain types only need `ToSchema`.
//!
//! Swagger UI serves the document in debug builds, and
//! `cargo run --bin openapi-dump` exports it for client generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::{
    admin, animals, auth, bookings, cart, cases, health, marketplace, notifications, orders,
    seller, users, vets,
};

/// Name of the cookie security scheme referenced by protected operations.
pub const SESSION_SECURITY_SCHEME: &str = "SessionCookie";

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            SESSION_SECURITY_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login or /api/v1/auth/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "AniLink API",
        description = "Livestock records, veterinary bookings, and an agricultural marketplace."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::request_password_reset,
        auth::verify_password_reset,
        auth::confirm_password_reset,
        users::current_user,
        users::update_current_user,
        animals::list_animals,
        animals::create_animal,
        animals::get_animal,
        animals::update_animal,
        animals::delete_animal,
        animals::add_vaccination,
        animals::add_treatment,
        cases::list_cases,
        cases::create_case,
        cases::get_case,
        cases::assign_vet,
        cases::close_case,
        vets::search_vets,
        vets::my_profile,
        vets::upsert_my_profile,
        vets::set_my_availability,
        vets::get_vet,
        vets::get_vet_availability,
        bookings::list_bookings,
        bookings::create_booking,
        bookings::get_booking,
        bookings::update_booking_status,
        marketplace::search_products,
        marketplace::get_product,
        seller::list_my_products,
        seller::create_product,
        seller::update_product,
        seller::deactivate_product,
        seller::get_profile,
        seller::upsert_profile,
        seller::dashboard,
        seller::list_orders,
        seller::update_order_status,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::cancel_order,
        cart::get_cart,
        cart::clear_cart,
        cart::add_item,
        cart::set_item_qty,
        cart::remove_item,
        cart::checkout,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        admin::stats,
        admin::reports_overview,
        admin::list_users,
        admin::update_user,
        admin::list_vets,
        admin::approve_vet,
        admin::reject_vet,
        admin::list_products,
        admin::moderate_product,
        admin::get_settings,
        admin::update_settings,
        health::ready,
        health::live,
    ),
    tags(
        (name = "auth", description = "Registration, sessions, and password reset"),
        (name = "users", description = "The signed-in account"),
        (name = "animals", description = "Herd records with vaccination and treatment history"),
        (name = "cases", description = "Health cases raised by owners"),
        (name = "vets", description = "Vet directory and vet self-service"),
        (name = "bookings", description = "Clinic and farm visit appointments"),
        (name = "marketplace", description = "Public product catalogue"),
        (name = "seller", description = "Seller listings, storefront, and fulfilment"),
        (name = "orders", description = "Buyer orders"),
        (name = "cart", description = "Session cart and checkout"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "admin", description = "Platform administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
