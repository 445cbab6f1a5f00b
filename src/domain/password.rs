//! Password value object.
//!
//! Argon2 hashing for account passwords. Plain text never leaves this module
//! except as the caller's own input.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Hash checked when the account does not exist, so a failed login costs the
/// same whether or not the email is registered.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$9Rj1y0lq0kVQdY5H1r3mKxQ4Yx2hJm1j7Vb0o7P6x9A";

/// A stored Argon2 password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Password {
    /// Hash a new plain-text password after checking its length.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        Self::check_length(plain_text)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// True if `plain_text` matches. A malformed stored hash never matches.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }

    /// Verify against an optional stored hash, burning a verification on a
    /// dummy hash when there is none.
    pub fn verify_stored(stored: Option<&str>, plain_text: &str) -> bool {
        match stored {
            Some(hash) => Self::from_hash(hash).verify(plain_text),
            None => {
                let _ = Self::from_hash(DUMMY_HASH).verify(plain_text);
                false
            }
        }
    }

    fn check_length(plain_text: &str) -> AppResult<()> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
