//! In-memory broker
//!
//! Reference [`ServiceBroker`] that keeps instances and bindings in hashmaps.
//! Suitable for development and smoke testing the HTTP plane.
//! Data is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::broker::{ProvisionOutcome, ProvisioningMode, ServiceBroker};
use crate::catalog::Catalog;
use crate::error::{BrokerError, Result};
use crate::types::{
    Binding, LastOperation, LastOperationState, ProvisionedInstance, RequestContext,
    ServiceDetails,
};

#[derive(Debug)]
struct InstanceRecord {
    details: ServiceDetails,
    bindings: HashMap<String, Binding>,
    /// Polls left before a deferred provision reports success
    pending_polls: u32,
}

/// In-memory broker implementation
#[derive(Debug)]
pub struct MemoryBroker {
    catalog: Catalog,
    mode: ProvisioningMode,
    instance_limit: Option<usize>,
    dashboard_url: Option<String>,
    polls_until_ready: u32,
    instances: RwLock<HashMap<String, InstanceRecord>>,
}

impl MemoryBroker {
    /// Create a synchronous broker offering the given catalog
    pub fn new(catalog: Catalog) -> Self {
        MemoryBrokerBuilder::new(catalog).build()
    }

    /// Start configuring a broker
    pub fn builder(catalog: Catalog) -> MemoryBrokerBuilder {
        MemoryBrokerBuilder::new(catalog)
    }

    /// Number of provisioned instances
    pub fn instance_count(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Details an instance was provisioned with
    pub fn instance_details(&self, instance_id: &str) -> Option<ServiceDetails> {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(instance_id)
            .map(|record| record.details.clone())
    }

    fn insert_instance(&self, instance_id: &str, details: ServiceDetails, pending_polls: u32) -> Result<()> {
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);

        if instances.contains_key(instance_id) {
            return Err(BrokerError::InstanceAlreadyExists);
        }

        if let Some(limit) = self.instance_limit {
            if instances.len() >= limit {
                return Err(BrokerError::InstanceLimitReached);
            }
        }

        instances.insert(
            instance_id.to_string(),
            InstanceRecord {
                details,
                bindings: HashMap::new(),
                pending_polls,
            },
        );
        Ok(())
    }

    fn provisioned(&self) -> ProvisionedInstance {
        ProvisionedInstance {
            dashboard_url: self.dashboard_url.clone(),
        }
    }
}

#[async_trait]
impl ServiceBroker for MemoryBroker {
    fn provisioning_mode(&self) -> ProvisioningMode {
        self.mode
    }

    async fn services(&self, _ctx: &RequestContext) -> Result<Catalog> {
        Ok(self.catalog.clone())
    }

    async fn provision(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ServiceDetails,
    ) -> Result<ProvisionedInstance> {
        if self.mode == ProvisioningMode::AsynchronousOnly {
            return Err(BrokerError::AsyncRequired);
        }

        self.insert_instance(instance_id, details, 0)?;
        info!(instance_id = %instance_id, region = ?ctx.region, "Provisioned instance");
        Ok(self.provisioned())
    }

    async fn provision_async(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ServiceDetails,
    ) -> Result<ProvisionOutcome> {
        if !self.mode.supports_async() {
            return self
                .provision(ctx, instance_id, details)
                .await
                .map(ProvisionOutcome::Completed);
        }

        self.insert_instance(instance_id, details, self.polls_until_ready)?;
        info!(
            instance_id = %instance_id,
            region = ?ctx.region,
            polls_until_ready = self.polls_until_ready,
            "Accepted asynchronous provision"
        );
        Ok(ProvisionOutcome::Pending)
    }

    async fn deprovision(&self, _ctx: &RequestContext, instance_id: &str) -> Result<()> {
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        match instances.remove(instance_id) {
            Some(record) => {
                info!(
                    instance_id = %instance_id,
                    bindings = record.bindings.len(),
                    "Deprovisioned instance"
                );
                Ok(())
            }
            None => Err(BrokerError::InstanceDoesNotExist),
        }
    }

    async fn last_operation(
        &self,
        _ctx: &RequestContext,
        instance_id: &str,
    ) -> Result<LastOperation> {
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let record = instances
            .get_mut(instance_id)
            .ok_or(BrokerError::InstanceDoesNotExist)?;

        if record.pending_polls > 0 {
            record.pending_polls -= 1;
            return Ok(LastOperation::new(
                LastOperationState::InProgress,
                "provisioning in progress",
            ));
        }

        Ok(LastOperation::new(LastOperationState::Succeeded, "instance provisioned"))
    }

    async fn bind(
        &self,
        _ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
    ) -> Result<Binding> {
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let record = instances
            .get_mut(instance_id)
            .ok_or(BrokerError::InstanceDoesNotExist)?;

        if record.bindings.contains_key(binding_id) {
            return Err(BrokerError::BindingAlreadyExists);
        }

        let binding = Binding::new(serde_json::json!({
            "uri": format!("memory://{}/{}", instance_id, binding_id),
            "username": binding_id,
            "password": Uuid::new_v4().to_string(),
        }));
        record.bindings.insert(binding_id.to_string(), binding.clone());

        info!(instance_id = %instance_id, binding_id = %binding_id, "Created binding");
        Ok(binding)
    }

    async fn unbind(
        &self,
        _ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
    ) -> Result<()> {
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let record = instances
            .get_mut(instance_id)
            .ok_or(BrokerError::InstanceDoesNotExist)?;

        record
            .bindings
            .remove(binding_id)
            .map(|_| ())
            .ok_or(BrokerError::BindingDoesNotExist)
    }
}

/// Builder for [`MemoryBroker`]
#[derive(Debug)]
pub struct MemoryBrokerBuilder {
    catalog: Catalog,
    mode: ProvisioningMode,
    instance_limit: Option<usize>,
    dashboard_url: Option<String>,
    polls_until_ready: u32,
}

impl MemoryBrokerBuilder {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            mode: ProvisioningMode::Synchronous,
            instance_limit: None,
            dashboard_url: None,
            polls_until_ready: 1,
        }
    }

    pub fn mode(mut self, mode: ProvisioningMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn instance_limit(mut self, limit: usize) -> Self {
        self.instance_limit = Some(limit);
        self
    }

    pub fn dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.dashboard_url = Some(url.into());
        self
    }

    /// Number of last-operation polls a deferred provision reports
    /// `in progress` before succeeding
    pub fn polls_until_ready(mut self, polls: u32) -> Self {
        self.polls_until_ready = polls;
        self
    }

    pub fn build(self) -> MemoryBroker {
        MemoryBroker {
            catalog: self.catalog,
            mode: self.mode,
            instance_limit: self.instance_limit,
            dashboard_url: self.dashboard_url,
            polls_until_ready: self.polls_until_ready,
            instances: RwLock::new(HashMap::new()),
        }
    }
}
