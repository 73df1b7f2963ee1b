//! Stateless access and refresh tokens
//!
//! Tokens only carry identity. Role and account status are looked up on
//! every request so that a demotion or suspension takes effect immediately.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use mart_core::Snowflake;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
    /// Shared by the access and refresh token of one login
    pub sid: String,
}

impl Claims {
    /// # Errors
    /// Returns `InvalidToken` if the subject is not an id
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, issuer: impl Into<String>, access_ttl: i64, refresh_ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    #[must_use]
    pub fn from_config(config: &JwtConfig, issuer: &str) -> Self {
        Self::new(
            &config.secret,
            issuer,
            config.access_token_expiry,
            config.refresh_token_expiry,
        )
    }

    /// Issue a fresh pair for a new login session
    ///
    /// # Errors
    /// Returns an error if encoding fails
    pub fn issue(&self, user_id: Snowflake) -> Result<TokenPair, AppError> {
        self.issue_for_session(user_id, Uuid::new_v4().to_string())
    }

    fn issue_for_session(&self, user_id: Snowflake, sid: String) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.encode(user_id, TokenType::Access, &sid)?,
            refresh_token: self.encode(user_id, TokenType::Refresh, &sid)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl,
        })
    }

    fn encode(&self, user_id: Snowflake, token_type: TokenType, sid: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
            token_type,
            sid: sid.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to encode token: {e}")))
    }

    /// Decode a token and require the given type
    ///
    /// # Errors
    /// `TokenExpired` for an expired signature, `InvalidToken` otherwise
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?
            .claims;

        if claims.token_type != expected {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new pair in the same session
    ///
    /// # Errors
    /// Returns an error if the refresh token is invalid or expired
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.verify(refresh_token, TokenType::Refresh)?;
        let user_id = claims.user_id()?;
        self.issue_for_session(user_id, claims.sid)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", "mart-test", 900, 604_800)
    }

    #[test]
    fn issued_pair_verifies() {
        let svc = service();
        let user = Snowflake::new(12345);
        let pair = svc.issue(user).unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);

        let access = svc.verify(&pair.access_token, TokenType::Access).unwrap();
        assert_eq!(access.user_id().unwrap(), user);
        let refresh = svc.verify(&pair.refresh_token, TokenType::Refresh).unwrap();
        assert_eq!(access.sid, refresh.sid);
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let svc = service();
        let pair = svc.issue(Snowflake::new(1)).unwrap();
        assert!(matches!(
            svc.verify(&pair.refresh_token, TokenType::Access),
            Err(AppError::InvalidToken)
        ));
        assert!(svc.refresh(&pair.access_token).is_err());
    }

    #[test]
    fn refresh_keeps_session() {
        let svc = service();
        let pair = svc.issue(Snowflake::new(7)).unwrap();
        let sid = svc.verify(&pair.access_token, TokenType::Access).unwrap().sid;

        let renewed = svc.refresh(&pair.refresh_token).unwrap();
        let claims = svc.verify(&renewed.access_token, TokenType::Access).unwrap();
        assert_eq!(claims.sid, sid);
        assert_eq!(claims.user_id().unwrap(), Snowflake::new(7));
    }

    #[test]
    fn foreign_issuer_rejected() {
        let other = JwtService::new("test-secret-key-that-is-long-enough", "someone-else", 900, 900);
        let pair = other.issue(Snowflake::new(1)).unwrap();
        assert!(service().verify(&pair.access_token, TokenType::Access).is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            service().verify("invalid.token.here", TokenType::Access),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_reports_expiry() {
        // Beyond the default 60s leeway
        let svc = JwtService::new("test-secret-key-that-is-long-enough", "mart-test", -120, -120);
        let pair = svc.issue(Snowflake::new(1)).unwrap();
        assert!(matches!(
            svc.verify(&pair.access_token, TokenType::Access),
            Err(AppError::TokenExpired)
        ));
    }
}
