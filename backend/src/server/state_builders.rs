//! Assemble the HTTP state from whichever storage backend is configured.

use actix_web::web;
use tracing::{info, warn};

use anilink::inbound::http::state::{HttpState, ServiceOptions};
use anilink::outbound::memory::InMemoryStore;
use anilink::outbound::persistence::{DbPool, DieselRepositories};

use super::ServerConfig;

/// Wire every service over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(http_state_for(config.db_pool.as_ref(), config.services.clone()))
}

fn http_state_for(pool: Option<&DbPool>, options: ServiceOptions) -> HttpState {
    match pool {
        Some(pool) => {
            info!("serving from PostgreSQL");
            HttpState::from_repositories(&DieselRepositories::new(pool.clone()), options)
        }
        None => {
            warn!("no database configured; data lives in process memory and is lost on restart");
            HttpState::from_repositories(&InMemoryStore::new(), options)
        }
    }
}
