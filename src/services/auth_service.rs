//! Authentication service - accounts, login and token verification.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, MIN_NAME_LENGTH, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Actor, Password, Role, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role)
    }
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    /// Role of the authenticated account
    pub role: Role,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a patient account together with its patient profile
    async fn register_patient(&self, name: String, email: String, password: String)
        -> AppResult<User>;

    /// Create an admin account together with its admin profile
    async fn create_admin(&self, name: String, email: String, password: String)
        -> AppResult<User>;

    /// Check credentials and issue a JWT
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Account behind an authenticated actor
    async fn current_user(&self, actor: Actor) -> AppResult<User>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        role: user.role,
    })
}

fn clean_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if (name.chars().count() as u64) < MIN_NAME_LENGTH {
        return Err(AppError::validation("Name is required"));
    }
    Ok(name.to_string())
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    /// User row plus the role-specific profile row, atomically.
    async fn create_account(
        &self,
        name: String,
        email: String,
        password: String,
        role: Role,
    ) -> AppResult<User> {
        let name = clean_name(&name)?;
        let password_hash = Password::new(&password)?.into_string();

        let user = with_transaction!(self.uow, |tx| {
            let users = tx.users();
            if users.find_by_email(&email).await?.is_some() {
                return Err(AppError::conflict("Email is already registered"));
            }

            let user = users.create(name, &email, password_hash, role).await?;
            match role {
                Role::Patient => users.create_patient_profile(user.id).await?,
                Role::Admin => users.create_admin_profile(user.id).await?,
                Role::Doctor => {}
            }
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register_patient(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        self.create_account(name, email, password, Role::Patient).await
    }

    async fn create_admin(&self, name: String, email: String, password: String) -> AppResult<User> {
        self.create_account(name, email, password, Role::Admin).await
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&email).await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
        if !Password::verify_stored(stored_hash, &password) {
            tracing::debug!("Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let user = user.ok_or(AppError::InvalidCredentials)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Login succeeded");
        generate_token(&user, &self.config)
    }

    async fn current_user(&self, actor: Actor) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(actor.id)
            .await?
            .ok_or_not_found("User")
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
