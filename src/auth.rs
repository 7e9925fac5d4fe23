use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
};

/// Header accepted as the username in `Env::Local` only.
pub const DEV_USER_HEADER: &str = "x-user";

/// Claims
///
/// Payload of the bearer tokens issued by the login service. This service only validates
/// them; issuing tokens is not its job.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the username.
    pub sub: String,
    /// Numeric user id, when the issuer includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Expiration Time (exp): tokens past this timestamp are rejected.
    pub exp: usize,
}

/// CurrentUser
///
/// The identity resolved for a request. Resolution itself can succeed with an empty
/// username; whether that counts as authenticated is up to each handler (see `is_present`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    pub id: Option<i64>,
}

impl CurrentUser {
    /// is_present
    ///
    /// Truthiness of the resolved user. Listing and reading cards require it; creating,
    /// updating and deleting only require that resolution did not fail.
    pub fn is_present(&self) -> bool {
        !self.username.is_empty()
    }

    /// Rejects with 401 unless `is_present` holds.
    pub fn require_present(&self) -> Result<(), ApiError> {
        if self.is_present() {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// CurrentUser Extractor Implementation
///
/// 1. Local Bypass: in `Env::Local`, the `x-user` header is taken as the username.
/// 2. Token Validation: `Authorization: Bearer <jwt>`, HS256 with the configured secret,
///    expiry enforced.
///
/// Rejection: `ApiError::Unauthorized` (401, `WWW-Authenticate: Bearer`) on any failure.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(username) = parts
                .headers
                .get(DEV_USER_HEADER)
                .and_then(|value| value.to_str().ok())
            {
                return Ok(CurrentUser {
                    username: username.to_string(),
                    id: None,
                });
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!("rejected bearer token: {:?}", e.kind());
            ApiError::Unauthorized
        })?;

        Ok(CurrentUser {
            username: token_data.claims.sub,
            id: token_data.claims.id,
        })
    }
}
