//! Application settings and the HTTP server configuration object.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use anilink::domain::ResetPolicy;
use anilink::inbound::http::state::ServiceOptions;
use anilink::outbound::persistence::DbPool;
use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_PORT: u16 = 8080;
pub(crate) const DEFAULT_SESSION_KEY_PATH: &str = "/var/run/secrets/session_key";

/// Settings layered from CLI flags, `ANILINK_*` variables, and a config file.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ANILINK")]
pub struct AppSettings {
    /// Address to bind. Defaults to all interfaces.
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    /// PostgreSQL connection string. Without one the server keeps all data
    /// in process memory.
    pub database_url: Option<String>,
    /// Apply pending schema migrations before serving. Defaults to `true`.
    pub run_migrations: Option<bool>,
    pub session_key_file: Option<PathBuf>,
    pub session_cookie_secure: Option<bool>,
    /// `Strict`, `Lax`, or `None`.
    pub session_same_site: Option<String>,
    pub session_allow_ephemeral: Option<bool>,
    pub password_reset_ttl_minutes: Option<u32>,
    pub password_reset_cooldown_seconds: Option<u32>,
}

impl AppSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    pub fn migrations_enabled(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn session_key_path(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_PATH))
    }

    /// Password reset lifetime and cooldown, falling back to the defaults.
    pub fn reset_policy(&self) -> ResetPolicy {
        let defaults = ResetPolicy::default();
        ResetPolicy {
            ttl: self
                .password_reset_ttl_minutes
                .map_or(defaults.ttl, |minutes| Duration::minutes(i64::from(minutes))),
            cooldown: self
                .password_reset_cooldown_seconds
                .map_or(defaults.cooldown, |seconds| Duration::seconds(i64::from(seconds))),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) services: ServiceOptions,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            services: ServiceOptions::default(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Serve from PostgreSQL instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.services.reset_policy = policy;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
