//! # Service Broker Core
//!
//! Domain types and the broker capability consumed by the service broker
//! HTTP plane.
//!
//! ## Key Concepts
//!
//! - **Broker**: the pluggable implementation that actually provisions and
//!   binds services. It owns all instance and binding state.
//! - **Instance**: a provisioned unit of an offered service, identified by an
//!   opaque id chosen by the calling platform.
//! - **Binding**: a credential grant between an instance and an application.
//! - **Provisioning mode**: whether a broker completes provisioning
//!   synchronously, may defer it, or can only defer it.
//!
//! The HTTP plane never tracks instances or bindings itself; every
//! "already exists" or "does not exist" fact comes from a [`ServiceBroker`].

pub mod broker;
pub mod catalog;
pub mod error;
pub mod memory;
pub mod types;

pub use broker::{ProvisionOutcome, ProvisioningMode, ServiceBroker};
pub use catalog::{
    Catalog, Service, ServiceDashboardClient, ServiceMetadata, ServicePlan, ServicePlanMetadata,
};
pub use error::{BrokerError, Result};
pub use memory::{MemoryBroker, MemoryBrokerBuilder};
pub use types::{
    Binding, LastOperation, LastOperationState, ProvisionedInstance, RequestContext,
    ServiceDetails,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
