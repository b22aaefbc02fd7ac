//! Port for platform settings persistence.

use async_trait::async_trait;

use crate::domain::SettingKey;

use super::define_port_error;

define_port_error! {
    /// Errors raised by settings repository adapters.
    pub enum SettingsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "settings repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "settings repository query failed: {message}",
    }
}

/// Port for the platform key/value settings table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Every stored key/value pair.
    async fn load(&self) -> Result<Vec<(String, String)>, SettingsRepositoryError>;

    /// Upsert the given values.
    async fn save(&self, values: &[(SettingKey, String)]) -> Result<(), SettingsRepositoryError>;
}
