//! Account services: registration, login, profile, and password resets.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountsCommand, AccountsQuery, PasswordResetNotifier, PasswordResetRecord,
    PasswordResetRepository, PasswordResetRepositoryError, ProfileUpdate, RegisterRequest,
    StoredUser, UserRepository, UserRepositoryError,
};
use crate::domain::validation::optional_text;
use crate::domain::{
    Actor, EmailAddress, Error, GeoPoint, LoginCredentials, Password, PasswordDigest,
    ResetToken, Role, User, UserId, UserProfile, UserWithProfile, invalid_field,
};

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => Error::conflict("email address is already registered")
            .with_details(json!({ "field": "email", "code": "duplicate" })),
        UserRepositoryError::DuplicatePhone => Error::conflict("phone number is already registered")
            .with_details(json!({ "field": "phone", "code": "duplicate" })),
    }
}

fn map_reset_error(error: PasswordResetRepositoryError) -> Error {
    match error {
        PasswordResetRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("password reset repository unavailable: {message}"))
        }
        PasswordResetRepositoryError::Query { message } => {
            Error::internal(format!("password reset repository error: {message}"))
        }
    }
}

/// Lifetime and rate limit of password reset tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPolicy {
    pub ttl: Duration,
    pub cooldown: Duration,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(30),
            cooldown: Duration::seconds(60),
        }
    }
}

/// Account service implementing the accounts driving ports.
#[derive(Clone)]
pub struct AccountsService<U, P> {
    users: Arc<U>,
    resets: Arc<P>,
    notifier: Arc<dyn PasswordResetNotifier>,
    clock: Arc<dyn Clock>,
    policy: ResetPolicy,
}

impl<U, P> AccountsService<U, P> {
    pub fn new(
        users: Arc<U>,
        resets: Arc<P>,
        notifier: Arc<dyn PasswordResetNotifier>,
        clock: Arc<dyn Clock>,
        policy: ResetPolicy,
    ) -> Self {
        Self {
            users,
            resets,
            notifier,
            clock,
            policy,
        }
    }
}

async fn hash_password(password: Password) -> Result<PasswordDigest, Error> {
    tokio::task::spawn_blocking(move || PasswordDigest::hash(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(|err| Error::internal(err.to_string()))
}

/// Digest verified against when a login names an unknown email, so the
/// response takes the same argon2 work as a wrong password.
static UNKNOWN_ACCOUNT_DIGEST: OnceLock<PasswordDigest> = OnceLock::new();

async fn unknown_account_digest() -> Result<PasswordDigest, Error> {
    if let Some(digest) = UNKNOWN_ACCOUNT_DIGEST.get() {
        return Ok(digest.clone());
    }
    let placeholder = Password::new("unknown-account-placeholder")
        .map_err(|err| Error::internal(err.to_string()))?;
    let digest = hash_password(placeholder).await?;
    Ok(UNKNOWN_ACCOUNT_DIGEST.get_or_init(|| digest).clone())
}

async fn verify_password(
    digest: PasswordDigest,
    candidate: Zeroizing<String>,
) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || digest.verify(&candidate))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
}

fn merge_text(
    field: &str,
    update: Option<String>,
    current: Option<String>,
    max: usize,
) -> Result<Option<String>, Error> {
    match update {
        Some(raw) => optional_text(field, Some(&raw), max),
        None => Ok(current),
    }
}

impl<U, P> AccountsService<U, P>
where
    U: UserRepository,
    P: PasswordResetRepository,
{
    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn with_profile(&self, user: User) -> Result<UserWithProfile, Error> {
        let profile = self
            .users
            .find_profile(&user.id)
            .await
            .map_err(map_user_error)?;
        Ok(UserWithProfile { user, profile })
    }
}

#[async_trait]
impl<U, P> AccountsCommand for AccountsService<U, P>
where
    U: UserRepository,
    P: PasswordResetRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<User, Error> {
        let role = request.role.unwrap_or(Role::Owner);
        if role == Role::Admin {
            return Err(Error::forbidden("admin accounts cannot be self-registered"));
        }
        let password = hash_password(request.password).await?;
        let user = User {
            id: UserId::random(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            role,
            is_active: true,
            created_at: self.clock.utc(),
        };
        let stored = StoredUser {
            user: user.clone(),
            password,
        };
        self.users
            .create(&stored, &UserProfile::default())
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, role = %user.role, "account registered");
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let candidate = Zeroizing::new(credentials.password().to_owned());
        let found = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        let Some(stored) = found else {
            verify_password(unknown_account_digest().await?, candidate).await?;
            return Err(Error::unauthorized("invalid email or password"));
        };
        let matches = verify_password(stored.password, candidate).await?;
        if !matches {
            return Err(Error::unauthorized("invalid email or password"));
        }
        if !stored.user.is_active {
            return Err(Error::forbidden("this account has been deactivated"));
        }
        Ok(stored.user)
    }

    async fn update_me(&self, actor: &Actor, update: ProfileUpdate) -> Result<UserWithProfile, Error> {
        let mut user = self.load_user(&actor.user_id).await?;
        let current = self
            .users
            .find_profile(&user.id)
            .await
            .map_err(map_user_error)?;

        let latitude = update.latitude.or(current.latitude);
        let longitude = update.longitude.or(current.longitude);
        let point = GeoPoint::from_optional(latitude, longitude).map_err(|err| {
            invalid_field("latitude", "invalid_coordinates", err.to_string(), None)
        })?;
        let profile = UserProfile {
            district: merge_text("district", update.district, current.district, 100)?,
            region: merge_text("region", update.region, current.region, 100)?,
            address_text: merge_text("addressText", update.address_text, current.address_text, 300)?,
            latitude: point.map(|p| p.latitude()),
            longitude: point.map(|p| p.longitude()),
            avatar_url: merge_text("avatarUrl", update.avatar_url, current.avatar_url, 500)?,
        };

        let account_changed = update.name.is_some() || update.phone.is_some();
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if account_changed {
            self.users
                .update_account(&user)
                .await
                .map_err(map_user_error)?;
        }
        self.users
            .save_profile(&user.id, &profile)
            .await
            .map_err(map_user_error)?;
        Ok(UserWithProfile { user, profile })
    }

    async fn request_password_reset(&self, email: EmailAddress) -> Result<(), Error> {
        let Some(stored) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
        else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };
        let user = stored.user;
        if !user.is_active {
            debug!(user_id = %user.id, "password reset requested for inactive account");
            return Ok(());
        }

        let now = self.clock.utc();
        let latest = self
            .resets
            .latest_for_user(&user.id)
            .await
            .map_err(map_reset_error)?;
        if latest.is_some_and(|record| now - record.created_at < self.policy.cooldown) {
            debug!(user_id = %user.id, "password reset within cooldown; ignoring");
            return Ok(());
        }

        let token = ResetToken::generate();
        let record = PasswordResetRecord {
            digest: token.digest(),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.policy.ttl,
            used_at: None,
        };
        self.resets.insert(&record).await.map_err(map_reset_error)?;
        if let Err(error) = self.notifier.deliver(&user, &token, record.expires_at).await {
            warn!(%error, user_id = %user.id, "password reset token could not be delivered");
        }
        Ok(())
    }

    async fn confirm_password_reset(&self, token: ResetToken, password: Password) -> Result<(), Error> {
        let invalid = || {
            invalid_field(
                "token",
                "invalid_token",
                "reset token is invalid or has expired",
                None,
            )
        };
        let digest = token.digest();
        let now = self.clock.utc();
        let record = self
            .resets
            .find_by_digest(&digest)
            .await
            .map_err(map_reset_error)?
            .filter(|record| record.is_redeemable(now))
            .ok_or_else(invalid)?;

        let password = hash_password(password).await?;
        let consumed = self
            .resets
            .mark_used(&digest, now)
            .await
            .map_err(map_reset_error)?;
        if !consumed {
            return Err(invalid());
        }
        self.users
            .update_password(&record.user_id, &password)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %record.user_id, "password reset completed");
        Ok(())
    }
}

#[async_trait]
impl<U, P> AccountsQuery for AccountsService<U, P>
where
    U: UserRepository,
    P: PasswordResetRepository,
{
    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        if !user.is_active {
            return Err(Error::forbidden("this account has been deactivated"));
        }
        Ok(Actor::new(user.id, user.role))
    }

    async fn me(&self, actor: &Actor) -> Result<UserWithProfile, Error> {
        let user = self.load_user(&actor.user_id).await?;
        self.with_profile(user).await
    }

    async fn verify_password_reset(&self, token: ResetToken) -> Result<bool, Error> {
        let now = self.clock.utc();
        let record = self
            .resets
            .find_by_digest(&token.digest())
            .await
            .map_err(map_reset_error)?;
        Ok(record.is_some_and(|record| record.is_redeemable(now)))
    }
}

#[cfg(test)]
#[path = "accounts_service_tests.rs"]
mod tests;
