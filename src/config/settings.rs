//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SLOT_DURATION_MINUTES,
    MAX_SLOT_DURATION_MINUTES, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// Length of a bookable slot when the caller does not ask for one
    pub slot_duration_minutes: i64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("slot_duration_minutes", &self.slot_duration_minutes)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is missing in a release build or is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let slot_duration_minutes =
            slot_duration_or_default(env::var("SLOT_DURATION_MINUTES").ok().as_deref());

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            slot_duration_minutes,
        }
    }

    /// Build a configuration explicitly (tests, embedded use).
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// Configured slot length, or the default when unset, unparseable or outside
/// `1..=MAX_SLOT_DURATION_MINUTES`.
fn slot_duration_or_default(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|minutes| (1..=MAX_SLOT_DURATION_MINUTES).contains(minutes))
        .unwrap_or(DEFAULT_SLOT_DURATION_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new("postgres://user:pass@db/clinic", "a-very-long-secret-for-signing-jwts");
        let printed = format!("{:?}", config);

        assert!(!printed.contains("pass@db"));
        assert!(!printed.contains("a-very-long-secret"));
        assert!(printed.contains("slot_duration_minutes: 30"));
    }

    #[test]
    fn test_slot_duration_falls_back_outside_bounds() {
        assert_eq!(slot_duration_or_default(Some("45")), 45);
        assert_eq!(slot_duration_or_default(Some("1440")), 1440);
        assert_eq!(slot_duration_or_default(Some("1441")), DEFAULT_SLOT_DURATION_MINUTES);
        assert_eq!(slot_duration_or_default(Some("0")), DEFAULT_SLOT_DURATION_MINUTES);
        assert_eq!(slot_duration_or_default(Some("-15")), DEFAULT_SLOT_DURATION_MINUTES);
        assert_eq!(slot_duration_or_default(Some("half-hour")), DEFAULT_SLOT_DURATION_MINUTES);
        assert_eq!(slot_duration_or_default(None), DEFAULT_SLOT_DURATION_MINUTES);
    }
}
