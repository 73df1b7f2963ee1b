//! Authentication service
//!
//! Registration, login, stateless token refresh, and resolving a bearer
//! token to the current account.

use chrono::Utc;
use mart_common::auth::{hash_password, validate_password_strength, verify_password};
use mart_common::{AppError, TokenType};
use mart_core::entities::User;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, TokenResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new account with the `user` role
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        request.validate()?;
        validate_password_strength(&request.password)?;

        let email = normalize_email(&request.email);
        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(ServiceError::conflict("Email already registered"));
        }

        let password_hash = hash_password(&request.password)?;

        let mut user = User::new(
            self.ctx.generate_id(),
            email,
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
        );
        user.phone = request.phone.filter(|p| !p.trim().is_empty());

        self.ctx.user_repo().create(&user, &password_hash).await?;
        info!(user_id = %user.id, "User registered");

        let tokens = self.ctx.jwt_service().issue(user.id)?;
        Ok(AuthResponse::new(tokens, &user))
    }

    /// Exchange credentials for a token pair
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let email = normalize_email(&request.email);

        let mut user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown email");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        if !user.is_active() {
            warn!(user_id = %user.id, status = %user.status, "Login refused for inactive account");
            return Err(AppError::AccountDisabled(user.status.to_string()).into());
        }

        user.record_login(Utc::now());
        self.ctx.user_repo().update(&user).await?;
        info!(user_id = %user.id, "User logged in");

        let tokens = self.ctx.jwt_service().issue(user.id)?;
        Ok(AuthResponse::new(tokens, &user))
    }

    /// Stateless refresh: a valid refresh token for an active account yields a new pair
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<TokenResponse> {
        let claims = self
            .ctx
            .jwt_service()
            .verify(&request.refresh_token, TokenType::Refresh)?;
        let user = self.load_active(claims.user_id()?).await?;

        let tokens = self.ctx.jwt_service().refresh(&request.refresh_token)?;
        info!(user_id = %user.id, "Tokens refreshed");
        Ok(tokens.into())
    }

    /// Resolve a bearer access token to the account behind it.
    /// Inactive accounts are refused with 403.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let claims = self.ctx.jwt_service().verify(token, TokenType::Access)?;
        self.load_active(claims.user_id()?).await
    }

    async fn load_active(&self, user_id: mart_core::Snowflake) -> ServiceResult<User> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        if !user.is_active() {
            warn!(user_id = %user.id, status = %user.status, "Token presented for inactive account");
            return Err(AppError::AccountDisabled(user.status.to_string()).into());
        }
        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
