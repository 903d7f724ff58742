//! Admin session tokens.
//!
//! The admin exchanges the shared `AGENCY_ADMIN_TOKEN` for a short-lived
//! HS256 JWT which then authorizes every `/api/admin` request.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::services::config::AdminAuthConfig;

const AUDIENCE: &str = "admin";
const SUBJECT: &str = "admin";

#[derive(Debug, Error)]
pub enum AdminTokenError {
    #[error("admin login is not configured")]
    NotConfigured,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct AdminSession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AdminTokenService {
    auth: Option<AdminAuthConfig>,
}

impl std::fmt::Debug for AdminTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminTokenService")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AdminTokenService {
    pub fn new(auth: Option<AdminAuthConfig>) -> Self {
        Self { auth }
    }

    /// Rejects every login and every token.
    pub fn disabled() -> Self {
        Self { auth: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.auth.is_some()
    }

    fn config(&self) -> Result<&AdminAuthConfig, AdminTokenError> {
        self.auth.as_ref().ok_or(AdminTokenError::NotConfigured)
    }

    /// Exchange the shared admin token for a session JWT.
    pub fn login(&self, presented: &str, now: DateTime<Utc>) -> Result<AdminSession, AdminTokenError> {
        let config = self.config()?;
        let expected = config.admin_token.expose_secret().as_bytes();
        if presented.is_empty() || !bool::from(presented.as_bytes().ct_eq(expected)) {
            return Err(AdminTokenError::InvalidCredentials);
        }
        self.issue(now)
    }

    pub fn issue(&self, now: DateTime<Utc>) -> Result<AdminSession, AdminTokenError> {
        let config = self.config()?;
        let expires_at = now + Duration::hours(config.session_ttl_hours);
        let claims = AdminClaims {
            sub: SUBJECT.to_string(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: AUDIENCE.to_string(),
        };
        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        )?;
        Ok(AdminSession {
            access_token,
            expires_at,
        })
    }

    pub fn verify(&self, token: &str) -> Result<AdminClaims, AdminTokenError> {
        let config = self.config()?;
        if token.trim().is_empty() {
            return Err(AdminTokenError::InvalidToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_audience(&[AUDIENCE]);
        validation.required_spec_claims =
            HashSet::from(["sub".to_string(), "exp".to_string(), "aud".to_string()]);
        validation.leeway = 30;

        let key = DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());
        decode::<AdminClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AdminTokenError::TokenExpired,
                _ => AdminTokenError::InvalidToken,
            })
    }
}
