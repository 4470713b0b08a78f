//! Outcome translation
//!
//! Maps every (operation, broker outcome) pair onto the status code, body
//! shape and event name the protocol prescribes. Pairs without an explicit
//! entry are unclassified failures.

use axum::{
    extract::rejection::{BytesRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

use servicebroker_core::BrokerError;

use crate::api::codec::CodecError;

/// `error` field of the async-required body
pub const ASYNC_REQUIRED_ERROR: &str = "AsyncRequired";

/// Challenge sent with every 401
pub const BASIC_CHALLENGE: &str = "Basic realm=\"service-broker\"";

/// Protocol operations exposed by the plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Catalog,
    Provision,
    Deprovision,
    Bind,
    Unbind,
    LastOperation,
}

impl Operation {
    /// Prefix of every event emitted for this operation
    pub fn log_key(&self) -> &'static str {
        match self {
            Operation::Catalog => "catalog",
            Operation::Provision => "provision",
            Operation::Deprovision => "deprovision",
            Operation::Bind => "bind",
            Operation::Unbind => "unbind",
            Operation::LastOperation => "lastOperation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.log_key())
    }
}

/// Shape of an error response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBody {
    /// `{}`
    Empty,
    /// `{"description": <error text>}`
    Description,
    /// `{"error": "AsyncRequired", "description": ...}`
    AsyncRequired,
}

/// How a broker failure is presented to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub status: StatusCode,
    pub body: ErrorBody,
    /// Event name, without the operation prefix
    pub event: &'static str,
}

impl Translation {
    const fn new(status: StatusCode, body: ErrorBody, event: &'static str) -> Self {
        Self { status, body, event }
    }
}

/// Look up the response for a broker failure
pub fn translate(operation: Operation, err: &BrokerError) -> Translation {
    use BrokerError::*;
    use ErrorBody::*;
    use Operation::*;

    match (operation, err) {
        (Provision, InstanceAlreadyExists) => {
            Translation::new(StatusCode::CONFLICT, Empty, "instance-already-exists")
        }
        (Provision, InstanceLimitReached) => Translation::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Description,
            "instance-limit-reached",
        ),
        (Provision, BrokerError::AsyncRequired) => Translation::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorBody::AsyncRequired,
            "async-required",
        ),
        (Deprovision, InstanceDoesNotExist) => {
            Translation::new(StatusCode::GONE, Empty, "instance-missing")
        }
        (Bind, InstanceDoesNotExist) => {
            Translation::new(StatusCode::NOT_FOUND, Description, "instance-missing")
        }
        (Bind, BindingAlreadyExists) => {
            Translation::new(StatusCode::CONFLICT, Description, "binding-already-exists")
        }
        // Unbind answers with empty bodies, unlike bind
        (Unbind, InstanceDoesNotExist) => {
            Translation::new(StatusCode::NOT_FOUND, Empty, "instance-missing")
        }
        (Unbind, BindingDoesNotExist) => {
            Translation::new(StatusCode::GONE, Empty, "binding-missing")
        }
        (LastOperation, InstanceDoesNotExist) => {
            Translation::new(StatusCode::NOT_FOUND, Description, "instance-missing")
        }
        _ => Translation::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Description,
            "unknown-error",
        ),
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request payload: {0}")]
    InvalidRequestPayload(#[from] CodecError),

    /// A path, query or body extractor refused the request
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{operation} failed: {source}")]
    Broker {
        operation: Operation,
        #[source]
        source: BrokerError,
    },
}

impl ApiError {
    pub fn broker(operation: Operation, source: BrokerError) -> Self {
        ApiError::Broker { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequestPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Broker { operation, source } => translate(*operation, source).status,
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::Unauthorized => json!({}),
            ApiError::InvalidRequestPayload(err) => json!({ "description": err.to_string() }),
            ApiError::Rejected { message, .. } => json!({ "description": message }),
            ApiError::Broker { operation, source } => match translate(*operation, source).body {
                ErrorBody::Empty => json!({}),
                ErrorBody::Description => json!({ "description": source.to_string() }),
                ErrorBody::AsyncRequired => json!({
                    "error": ASYNC_REQUIRED_ERROR,
                    "description": source.to_string(),
                }),
            },
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();

        if matches!(self, ApiError::Unauthorized) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BASIC_CHALLENGE),
            );
        }

        response
    }
}
