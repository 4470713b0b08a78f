//! Broker capability consumed by the HTTP plane
//!
//! A broker advertises how it provisions through [`ProvisioningMode`] rather
//! than through separate traits, so the plane can branch on the mode without
//! knowing the concrete implementation.

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::types::{Binding, LastOperation, ProvisionedInstance, RequestContext, ServiceDetails};

/// How a broker completes provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisioningMode {
    /// Provisioning always completes within the request
    #[default]
    Synchronous,
    /// Provisioning may complete within the request or be deferred when the
    /// caller accepts incomplete results
    Asynchronous,
    /// Provisioning is always deferred; callers must accept incomplete results
    AsynchronousOnly,
}

impl ProvisioningMode {
    /// Whether the broker can return a pending outcome at all
    pub fn supports_async(&self) -> bool {
        !matches!(self, ProvisioningMode::Synchronous)
    }
}

/// Result of an asynchronous-capable provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Provisioning finished within the request
    Completed(ProvisionedInstance),
    /// Provisioning was accepted and continues in the background
    Pending,
}

/// The pluggable broker behind the HTTP plane
///
/// Implementations own every piece of instance and binding state and must be
/// safe to call concurrently. Outcomes other than success are reported with
/// [`BrokerError`](crate::BrokerError) variants.
#[async_trait]
pub trait ServiceBroker: Send + Sync {
    /// Advertised provisioning mode
    fn provisioning_mode(&self) -> ProvisioningMode {
        ProvisioningMode::Synchronous
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Services and plans this broker offers
    async fn services(&self, ctx: &RequestContext) -> Result<Catalog>;

    // =========================================================================
    // Instance lifecycle
    // =========================================================================

    /// Provision an instance, completing before returning
    ///
    /// Asynchronous-only brokers answer with
    /// [`BrokerError::AsyncRequired`](crate::BrokerError::AsyncRequired).
    async fn provision(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ServiceDetails,
    ) -> Result<ProvisionedInstance>;

    /// Provision an instance for a caller that accepts incomplete results
    ///
    /// Only called for brokers whose mode supports async. The default
    /// completes synchronously.
    async fn provision_async(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ServiceDetails,
    ) -> Result<ProvisionOutcome> {
        self.provision(ctx, instance_id, details)
            .await
            .map(ProvisionOutcome::Completed)
    }

    /// Remove an instance
    async fn deprovision(&self, ctx: &RequestContext, instance_id: &str) -> Result<()>;

    /// Report the state of the most recent operation on an instance
    async fn last_operation(&self, ctx: &RequestContext, instance_id: &str)
        -> Result<LastOperation>;

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Create a binding and return its credentials
    async fn bind(&self, ctx: &RequestContext, instance_id: &str, binding_id: &str)
        -> Result<Binding>;

    /// Remove a binding
    async fn unbind(&self, ctx: &RequestContext, instance_id: &str, binding_id: &str)
        -> Result<()>;
}
