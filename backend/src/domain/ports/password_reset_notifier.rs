//! Port for delivering password reset tokens to account holders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ResetToken, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised while handing a reset token to a delivery channel.
    pub enum PasswordResetNotifierError {
        /// The delivery channel rejected or failed to accept the message.
        Delivery { message: String } => "password reset delivery failed: {message}",
    }
}

/// Delivery channel for reset tokens (email, SMS, ...).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    /// Send `token` to `user`. Implementations must not log the token.
    async fn deliver(
        &self,
        user: &User,
        token: &ResetToken,
        expires_at: DateTime<Utc>,
    ) -> Result<(), PasswordResetNotifierError>;
}
