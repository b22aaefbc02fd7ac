//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers live one module per resource. [`configure`] mounts all of them
//! so the server and the handler tests share a single route table.

use actix_web::web;

pub mod admin;
pub mod animals;
pub mod auth;
pub mod bookings;
pub mod cache_control;
pub mod cart;
pub mod cases;
pub mod error;
pub mod health;
pub mod marketplace;
pub mod notifications;
pub mod orders;
pub mod seller;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod vets;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments are registered ahead of `{id}` captures on the same
/// prefix; actix matches in registration order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::request_password_reset)
        .service(auth::verify_password_reset)
        .service(auth::confirm_password_reset)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(animals::list_animals)
        .service(animals::create_animal)
        .service(animals::get_animal)
        .service(animals::update_animal)
        .service(animals::delete_animal)
        .service(animals::add_vaccination)
        .service(animals::add_treatment)
        .service(cases::list_cases)
        .service(cases::create_case)
        .service(cases::get_case)
        .service(cases::assign_vet)
        .service(cases::close_case)
        .service(vets::search_vets)
        .service(vets::my_profile)
        .service(vets::upsert_my_profile)
        .service(vets::set_my_availability)
        .service(vets::get_vet)
        .service(vets::get_vet_availability)
        .service(bookings::list_bookings)
        .service(bookings::create_booking)
        .service(bookings::get_booking)
        .service(bookings::update_booking_status)
        .service(marketplace::search_products)
        .service(marketplace::get_product)
        .service(seller::list_my_products)
        .service(seller::create_product)
        .service(seller::update_product)
        .service(seller::deactivate_product)
        .service(seller::get_profile)
        .service(seller::upsert_profile)
        .service(seller::dashboard)
        .service(seller::list_orders)
        .service(seller::update_order_status)
        .service(orders::list_orders)
        .service(orders::place_order)
        .service(orders::get_order)
        .service(orders::cancel_order)
        .service(cart::get_cart)
        .service(cart::clear_cart)
        .service(cart::add_item)
        .service(cart::set_item_qty)
        .service(cart::remove_item)
        .service(cart::checkout)
        .service(notifications::list_notifications)
        .service(notifications::unread_count)
        .service(notifications::mark_all_read)
        .service(notifications::mark_read)
        .service(admin::stats)
        .service(admin::reports_overview)
        .service(admin::list_users)
        .service(admin::update_user)
        .service(admin::list_vets)
        .service(admin::approve_vet)
        .service(admin::reject_vet)
        .service(admin::list_products)
        .service(admin::moderate_product)
        .service(admin::get_settings)
        .service(admin::update_settings);
}
