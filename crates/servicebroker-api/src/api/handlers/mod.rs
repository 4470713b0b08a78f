//! API request handlers

pub mod binding;
pub mod catalog;
pub mod instance;
pub mod last_operation;

pub use binding::{bind, unbind};
pub use catalog::catalog;
pub use instance::{deprovision, provision};
pub use last_operation::last_operation;

use servicebroker_core::BrokerError;

use crate::api::error::{translate, ApiError};
use crate::logging::EventLogger;

/// Record the event for a broker failure and turn it into a response
pub(crate) fn broker_failure(log: &EventLogger<'_>, source: BrokerError) -> ApiError {
    let translation = translate(log.operation(), &source);
    log.error(translation.event, &source);
    ApiError::broker(log.operation(), source)
}
