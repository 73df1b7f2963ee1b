//! Authentication extractor
//!
//! Validates the bearer token, then loads the user so handlers see the
//! current role and status rather than whatever the token was minted with.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use mart_core::{Actor, User};
use mart_service::AuthService;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated, active caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub actor: Actor,
}

impl AuthUser {
    async fn resolve(state: &AppState, token: &str) -> Result<Self, ApiError> {
        let user = AuthService::new(state.service_context())
            .authenticate(token)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected bearer token");
                ApiError::Service(e)
            })?;
        let actor = user.actor();
        Ok(Self { user, actor })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        Self::resolve(&app_state, bearer.token()).await
    }
}

/// Caller identity for public routes.
///
/// `None` without an Authorization header; a header with a bad token is
/// still rejected.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref().map(|auth| &auth.actor)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => {
                let app_state = AppState::from_ref(state);
                let auth = AuthUser::resolve(&app_state, bearer.token()).await?;
                Ok(Self(Some(auth)))
            }
            Err(_) => Ok(Self(None)),
        }
    }
}
