//! Password reset delivery that records requests in the service log.
//!
//! No mail or SMS transport is wired in; operators relay reset links by
//! other means. The token itself is never logged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::ports::{PasswordResetNotifier, PasswordResetNotifierError};
use crate::domain::{ResetToken, User};

/// [`PasswordResetNotifier`] that emits a structured log line per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPasswordResetNotifier;

#[async_trait]
impl PasswordResetNotifier for LoggingPasswordResetNotifier {
    async fn deliver(
        &self,
        user: &User,
        _token: &ResetToken,
        expires_at: DateTime<Utc>,
    ) -> Result<(), PasswordResetNotifierError> {
        info!(
            user_id = %user.id,
            email = %user.email,
            expires_at = %expires_at.to_rfc3339(),
            "password reset token issued"
        );
        Ok(())
    }
}
