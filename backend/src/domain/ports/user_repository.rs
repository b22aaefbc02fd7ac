//! Port for account and profile persistence.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::{
    EmailAddress, PasswordDigest, User, UserAdminFilter, UserId, UserProfile,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this email address.
        DuplicateEmail => "email address is already registered",
        /// Another account already uses this phone number.
        DuplicatePhone => "phone number is already registered",
    }
}

/// Account row together with its password digest.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUser {
    pub user: User,
    pub password: PasswordDigest,
}

/// Port for reading and writing accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account with an initial profile.
    async fn create(
        &self,
        user: &StoredUser,
        profile: &UserProfile,
    ) -> Result<(), UserRepositoryError>;

    /// Find an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Find an account and its digest by login email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredUser>, UserRepositoryError>;

    /// Replace name, phone, role, and active flag.
    async fn update_account(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Read an account's profile. Missing profiles read as empty.
    async fn find_profile(&self, id: &UserId) -> Result<UserProfile, UserRepositoryError>;

    /// Replace an account's profile.
    async fn save_profile(
        &self,
        id: &UserId,
        profile: &UserProfile,
    ) -> Result<(), UserRepositoryError>;

    /// Replace an account's password digest.
    async fn update_password(
        &self,
        id: &UserId,
        password: &PasswordDigest,
    ) -> Result<(), UserRepositoryError>;

    /// Page through accounts, newest first, returning the page and the total.
    async fn list(
        &self,
        filter: &UserAdminFilter,
        page: PageParams,
    ) -> Result<(Vec<User>, u64), UserRepositoryError>;
}
