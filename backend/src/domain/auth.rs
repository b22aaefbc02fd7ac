//! Authentication primitives: passwords, credentials, and reset tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::EmailAddress;

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Maximum accepted password length in characters.
pub const PASSWORD_MAX_LEN: usize = 128;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter or longer than the accepted bounds.
    PasswordLength,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordLength => write!(
                f,
                "password must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"
            ),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Plain-text password held in zeroizing memory.
///
/// Construction enforces the length policy, so only passwords that are
/// acceptable for new accounts can be built with [`Password::new`]. Login uses
/// [`LoginCredentials`], which accepts any non-empty password.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a password chosen by a user.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        let length = raw.chars().count();
        if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&length) {
            return Err(CredentialValidationError::PasswordLength);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Borrow the secret.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Failure while hashing a password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Argon2 PHC string stored against an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `password` with a fresh random salt.
    pub fn hash(password: &Password) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })
    }

    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Check a candidate password. Malformed stored hashes never verify.
    pub fn verify(&self, candidate: &str) -> bool {
        PasswordHash::new(&self.0)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// PHC string for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated login credentials used by the accounts service.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use anilink::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Vet@Example.com ", "password").unwrap();
/// assert_eq!(creds.email().as_ref(), "vet@example.com");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email =
            EmailAddress::new(email).map_err(|_| CredentialValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Number of random bytes in a password reset token.
pub const RESET_TOKEN_BYTES: usize = 32;

/// Raw password reset token handed to the user out of band.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken(Zeroizing<String>);

impl ResetToken {
    /// Generate a random hex-encoded token.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Wrap a token supplied by a client.
    pub fn from_client(raw: &str) -> Self {
        Self(Zeroizing::new(raw.trim().to_owned()))
    }

    /// Borrow the token text.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 digest stored in place of the token.
    pub fn digest(&self) -> ResetTokenDigest {
        let hash = Sha256::digest(self.0.as_bytes());
        ResetTokenDigest(hex::encode(hash))
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(**redacted**)")
    }
}

/// Hex SHA-256 digest of a [`ResetToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResetTokenDigest(String);

impl ResetTokenDigest {
    /// Wrap a digest loaded from storage.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Hex digest text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialValidationError::InvalidEmail)]
    #[case("   ", "pw", CredentialValidationError::InvalidEmail)]
    #[case("user@example.com", "", CredentialValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("short")]
    #[case("")]
    fn passwords_enforce_minimum_length(#[case] raw: &str) {
        assert_eq!(
            Password::new(raw).expect_err("too short"),
            CredentialValidationError::PasswordLength
        );
    }

    #[rstest]
    fn digest_verifies_only_the_original_password() {
        let password = Password::new("correct horse battery").expect("valid password");
        let digest = PasswordDigest::hash(&password).expect("hashes");

        assert!(digest.as_str().starts_with("$argon2"));
        assert!(digest.verify("correct horse battery"));
        assert!(!digest.verify("wrong horse battery"));
    }

    #[rstest]
    fn malformed_stored_hash_never_verifies() {
        assert!(!PasswordDigest::from_phc("not-a-phc-string").verify("anything"));
    }

    #[rstest]
    fn reset_tokens_are_random_hex_and_digest_stably() {
        let token = ResetToken::generate();
        assert_eq!(token.expose().len(), RESET_TOKEN_BYTES * 2);
        assert!(token.expose().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token.expose(), ResetToken::generate().expose());

        let echoed = ResetToken::from_client(&format!(" {} ", token.expose()));
        assert_eq!(echoed.digest(), token.digest());
        assert_eq!(token.digest().as_str().len(), 64);
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let password = Password::new("super-secret").expect("valid");
        assert!(!format!("{password:?}").contains("super-secret"));
        let token = ResetToken::generate();
        assert!(!format!("{token:?}").contains(token.expose()));
    }
}
