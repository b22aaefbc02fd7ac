//! Port for password reset token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ResetTokenDigest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password reset repository adapters.
    pub enum PasswordResetRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "password reset repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "password reset repository query failed: {message}",
    }
}

/// Stored reset token. Only the digest of the token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetRecord {
    pub digest: ResetTokenDigest,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl PasswordResetRecord {
    /// Whether the token can still be redeemed at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}

/// Port for issuing and redeeming reset tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store a newly issued token.
    async fn insert(&self, record: &PasswordResetRecord) -> Result<(), PasswordResetRepositoryError>;

    /// Most recently issued token for a user, used for cooldowns.
    async fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PasswordResetRecord>, PasswordResetRepositoryError>;

    /// Look up a token by digest.
    async fn find_by_digest(
        &self,
        digest: &ResetTokenDigest,
    ) -> Result<Option<PasswordResetRecord>, PasswordResetRepositoryError>;

    /// Mark a token used. Returns `false` when it had already been used.
    async fn mark_used(
        &self,
        digest: &ResetTokenDigest,
        used_at: DateTime<Utc>,
    ) -> Result<bool, PasswordResetRepositoryError>;
}
