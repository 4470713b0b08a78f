//! Request decoding
//!
//! Turns query flags and request bodies into typed values. Failures here are
//! reported as [`CodecError`] and answered before the broker is consulted.

use std::collections::HashMap;
use thiserror::Error;

use servicebroker_core::ServiceDetails;

/// Query parameter carrying the caller's async opt-in
pub const ACCEPTS_INCOMPLETE: &str = "accepts_incomplete";

/// A request payload that could not be decoded
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a provision request body
pub fn decode_service_details(body: &[u8]) -> Result<ServiceDetails, CodecError> {
    if body.is_empty() {
        return Err(CodecError::EmptyBody);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Only the literal `true` opts in; anything else, or no flag, is `false`
pub fn accepts_incomplete(query: &HashMap<String, String>) -> bool {
    query
        .get(ACCEPTS_INCOMPLETE)
        .is_some_and(|value| value == "true")
}
