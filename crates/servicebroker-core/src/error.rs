//! Error types reported by broker implementations

use thiserror::Error;

/// Result type alias using BrokerError
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Outcomes a broker reports instead of success
///
/// Several of these are protocol signals rather than faults (`AsyncRequired`,
/// `InstanceAlreadyExists`, ...). The HTTP plane matches on the variant, never
/// on the message, so the `Display` text is free to be human oriented.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// An instance with the requested id is already provisioned
    #[error("instance already exists")]
    InstanceAlreadyExists,

    /// No instance with the requested id is known to the broker
    #[error("instance does not exist")]
    InstanceDoesNotExist,

    /// The broker refuses to provision more instances
    #[error("instance limit for this service has been reached")]
    InstanceLimitReached,

    /// A binding with the requested id already exists on the instance
    #[error("binding already exists")]
    BindingAlreadyExists,

    /// No binding with the requested id exists on the instance
    #[error("binding does not exist")]
    BindingDoesNotExist,

    /// The broker can only complete the request asynchronously and the caller
    /// did not opt in
    #[error("This service plan requires client support for asynchronous service operations.")]
    AsyncRequired,

    /// Anything else; the message is passed through to the caller verbatim
    #[error("{0}")]
    Other(String),
}

impl BrokerError {
    /// Create an unclassified failure from any message
    pub fn other(message: impl Into<String>) -> Self {
        BrokerError::Other(message.into())
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        BrokerError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_messages() {
        assert_eq!(BrokerError::InstanceAlreadyExists.to_string(), "instance already exists");
        assert_eq!(BrokerError::InstanceDoesNotExist.to_string(), "instance does not exist");
        assert_eq!(BrokerError::BindingAlreadyExists.to_string(), "binding already exists");
        assert_eq!(BrokerError::BindingDoesNotExist.to_string(), "binding does not exist");
        assert_eq!(
            BrokerError::InstanceLimitReached.to_string(),
            "instance limit for this service has been reached"
        );
    }

    #[test]
    fn test_other_is_verbatim() {
        assert_eq!(BrokerError::other("broker failed").to_string(), "broker failed");
    }
}
