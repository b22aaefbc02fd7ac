//! Shared cache-control policies for HTTP handlers.

use actix_web::http::header;

/// Per-user responses (profile, cart, inbox) must be revalidated before reuse.
pub const PRIVATE_NO_CACHE: &str = "private, no-cache, must-revalidate";

/// Probe responses must never be cached.
pub const NO_STORE: &str = "no-store";

/// Header tuple for responses that depend on the signed-in user.
pub const fn private_no_cache_header() -> (header::HeaderName, &'static str) {
    (header::CACHE_CONTROL, PRIVATE_NO_CACHE)
}

/// Header tuple for health probes.
pub const fn no_store_header() -> (header::HeaderName, &'static str) {
    (header::CACHE_CONTROL, NO_STORE)
}
