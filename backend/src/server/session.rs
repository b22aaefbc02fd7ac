//! Session cookie settings, validated per build mode.
//!
//! Debug builds tolerate missing toggles and fall back to development
//! defaults with a warning. Release builds require every toggle explicitly,
//! a key file of at least [`SESSION_KEY_MIN_LEN`] bytes, and no ephemeral
//! keys.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

use super::config::AppSettings;

pub(crate) const SESSION_KEY_MIN_LEN: usize = 64;
const COOKIE_SECURE: &str = "ANILINK_SESSION_COOKIE_SECURE";
const SAME_SITE: &str = "ANILINK_SESSION_SAME_SITE";
const ALLOW_EPHEMERAL: &str = "ANILINK_SESSION_ALLOW_EPHEMERAL";
const SAME_SITE_EXPECTED: &str = "Strict|Lax|None";
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated cookie settings.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("ANILINK_SESSION_SAME_SITE=None requires ANILINK_SESSION_COOKIE_SECURE=true")]
    InsecureSameSiteNone,
    #[error("ANILINK_SESSION_ALLOW_EPHEMERAL must be false in release builds")]
    EphemeralNotAllowed,
}

/// Resolve a toggle, defaulting with a warning in debug builds.
fn required<T>(
    value: Option<T>,
    name: &'static str,
    mode: BuildMode,
    debug_default: T,
) -> Result<T, SessionConfigError> {
    match value {
        Some(value) => Ok(value),
        None if mode.is_debug() => {
            warn!(setting = name, "session setting not provided; using development default");
            Ok(debug_default)
        }
        None => Err(SessionConfigError::Missing { name }),
    }
}

fn parse_same_site(
    raw: &str,
    cookie_secure: bool,
    mode: BuildMode,
) -> Result<SameSite, SessionConfigError> {
    let same_site = match raw.trim().to_ascii_lowercase().as_str() {
        "lax" => SameSite::Lax,
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ if mode.is_debug() => {
            warn!(setting = SAME_SITE, value = raw, "invalid SameSite policy; using Lax");
            SameSite::Lax
        }
        _ => {
            return Err(SessionConfigError::Invalid {
                name: SAME_SITE,
                value: raw.to_owned(),
                expected: SAME_SITE_EXPECTED,
            });
        }
    };
    if same_site == SameSite::None && !cookie_secure {
        if !mode.is_debug() {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
        warn!("SameSite=None without Secure; browsers may reject the session cookie");
    }
    Ok(same_site)
}

fn load_key(path: PathBuf, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), %error, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

/// Validate the session toggles in `settings` for `mode`.
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = required(settings.session_cookie_secure, COOKIE_SECURE, mode, true)?;
    let same_site = match settings.session_same_site.as_deref() {
        Some(raw) => parse_same_site(raw, cookie_secure, mode)?,
        None => required(None, SAME_SITE, mode, SameSite::Lax)?,
    };
    let allow_ephemeral = required(settings.session_allow_ephemeral, ALLOW_EPHEMERAL, mode, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = load_key(settings.session_key_path(), mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Short hex digest of the signing key, safe to log for rotation checks.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
