//! Driving ports for registration, login, and the caller's own account.

use async_trait::async_trait;

use crate::domain::{
    Actor, EmailAddress, Error, LoginCredentials, Password, PersonName, PhoneNumber,
    ResetToken, Role, User, UserId, UserWithProfile,
};

/// Validated self-registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: PersonName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub password: Password,
    pub role: Option<Role>,
}

/// Partial update of the caller's account and profile.
///
/// Blank text clears optional profile fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<PersonName>,
    pub phone: Option<PhoneNumber>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub address_text: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub avatar_url: Option<String>,
}

/// Account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create an account and its empty profile.
    async fn register(&self, request: RegisterRequest) -> Result<User, Error>;

    /// Check credentials and return the account.
    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Update the caller's account and profile.
    async fn update_me(&self, actor: &Actor, update: ProfileUpdate) -> Result<UserWithProfile, Error>;

    /// Issue a reset token when the account exists and no recent token was
    /// issued. Always succeeds from the caller's point of view.
    async fn request_password_reset(&self, email: EmailAddress) -> Result<(), Error>;

    /// Redeem a reset token and replace the password.
    async fn confirm_password_reset(&self, token: ResetToken, password: Password) -> Result<(), Error>;
}

/// Account reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsQuery: Send + Sync {
    /// Resolve a session user into an actor. Inactive accounts are forbidden.
    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error>;

    /// The caller's account with profile.
    async fn me(&self, actor: &Actor) -> Result<UserWithProfile, Error>;

    /// Whether a reset token could be redeemed now. Does not consume it.
    async fn verify_password_reset(&self, token: ResetToken) -> Result<bool, Error>;
}
