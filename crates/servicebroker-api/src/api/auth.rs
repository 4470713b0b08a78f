//! HTTP Basic authentication gate
//!
//! Every route sits behind [`require_basic_auth`]. A rejected request never
//! reaches a handler, so neither the body nor the broker is touched.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::AppState;

/// Username and password the platform must present
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerCredentials {
    pub username: String,
    pub password: String,
}

impl BrokerCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Why a request was not authenticated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("unsupported authorization scheme")]
    UnsupportedScheme,

    #[error("malformed basic credentials: {0}")]
    MalformedCredentials(String),

    #[error("credentials do not match")]
    InvalidCredentials,
}

/// Validates the `Authorization` header against fixed credentials
#[derive(Debug, Clone)]
pub struct CredentialGate {
    credentials: BrokerCredentials,
}

impl CredentialGate {
    pub fn new(credentials: BrokerCredentials) -> Self {
        Self { credentials }
    }

    /// Accept only `Basic` credentials equal, byte for byte, to the
    /// configured pair
    pub fn authenticate(&self, header: Option<&HeaderValue>) -> Result<(), AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let value = header
            .to_str()
            .map_err(|_| AuthError::MalformedCredentials("header is not visible ASCII".into()))?;

        let (scheme, encoded) = value
            .split_once(' ')
            .ok_or(AuthError::UnsupportedScheme)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::UnsupportedScheme);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AuthError::MalformedCredentials(e.to_string()))?;

        let colon = decoded
            .iter()
            .position(|b| *b == b':')
            .ok_or_else(|| AuthError::MalformedCredentials("missing ':' separator".into()))?;
        let (username, password) = (&decoded[..colon], &decoded[colon + 1..]);

        if username == self.credentials.username.as_bytes()
            && password == self.credentials.password.as_bytes()
        {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Reject unauthenticated requests with 401 before any further processing
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(err) = state
        .gate
        .authenticate(request.headers().get(header::AUTHORIZATION))
    {
        debug!(
            method = %request.method(),
            path = %request.uri().path(),
            reason = %err,
            "Rejected unauthenticated request"
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
