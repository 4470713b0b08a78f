//! Service Broker API
//!
//! HTTP façade for the platform-to-broker service management protocol. The
//! plane authenticates every call, decodes its payload, dispatches to a
//! pluggable [`ServiceBroker`](servicebroker_core::ServiceBroker) and renders
//! the broker's outcome as a status code, a JSON body and a structured event.
//!
//! ## API Endpoints
//!
//! All endpoints require HTTP Basic authentication.
//!
//! - `GET /v2/catalog` - Services and plans offered by the broker
//! - `PUT /v2/service_instances/{instance_id}` - Provision an instance
//!   (`?accepts_incomplete=true` opts in to asynchronous provisioning)
//! - `DELETE /v2/service_instances/{instance_id}` - Deprovision an instance
//! - `PUT /v2/service_instances/{instance_id}/service_bindings/{binding_id}` - Bind
//! - `DELETE /v2/service_instances/{instance_id}/service_bindings/{binding_id}` - Unbind
//! - `GET /v2/service_instances/{instance_id}/last_operation` - Poll the last operation
//!
//! The plane keeps no instance or binding state of its own.

pub mod api;
pub mod config;
pub mod logging;

pub use api::auth::{BrokerCredentials, CredentialGate};
pub use api::create_router;
pub use api::error::{ApiError, Operation};
pub use api::AppState;
pub use config::{ConfigError, ServerConfig};
pub use logging::{EventLevel, EventSink, LogEvent, MemorySink, TracingSink};
