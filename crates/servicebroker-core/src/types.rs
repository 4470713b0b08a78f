//! Request and response values exchanged with a broker

use serde::{Deserialize, Serialize};
use std::fmt;

/// Details of a provisioning request
///
/// Decoded from the request body of a provision call. Missing fields decode
/// to empty values, so two requests with the same JSON are always equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDetails {
    /// Catalog id of the service being provisioned
    #[serde(default)]
    pub service_id: String,

    /// Catalog id of the plan being provisioned
    #[serde(default)]
    pub plan_id: String,

    /// Platform organization the instance belongs to
    #[serde(default)]
    pub organization_guid: String,

    /// Platform space the instance belongs to
    #[serde(default)]
    pub space_guid: String,

    /// Arbitrary broker-specific parameters
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

impl ServiceDetails {
    /// Create details for a service plan
    pub fn new(service_id: impl Into<String>, plan_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            plan_id: plan_id.into(),
            ..Default::default()
        }
    }

    /// Set the organization and space the instance is created in
    pub fn in_space(
        mut self,
        organization_guid: impl Into<String>,
        space_guid: impl Into<String>,
    ) -> Self {
        self.organization_guid = organization_guid.into();
        self.space_guid = space_guid.into();
        self
    }

    /// Add a parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Result of a synchronously completed provision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedInstance {
    /// Dashboard for managing the new instance, if the service has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

impl ProvisionedInstance {
    /// Instance with a dashboard
    pub fn with_dashboard(url: impl Into<String>) -> Self {
        Self {
            dashboard_url: Some(url.into()),
        }
    }
}

/// Credentials handed to an application bound to an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Broker-defined credentials object
    pub credentials: serde_json::Value,

    /// Syslog drain the platform should forward application logs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
}

impl Binding {
    /// Create a binding carrying the given credentials
    pub fn new(credentials: serde_json::Value) -> Self {
        Self {
            credentials,
            syslog_drain_url: None,
        }
    }
}

/// State of the most recent operation on an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastOperationState {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "succeeded")]
    Succeeded,
    #[serde(rename = "failed")]
    Failed,
}

impl LastOperationState {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LastOperationState::InProgress => "in progress",
            LastOperationState::Succeeded => "succeeded",
            LastOperationState::Failed => "failed",
        }
    }
}

impl fmt::Display for LastOperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last operation report, rendered to the caller as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOperation {
    pub state: LastOperationState,
    pub description: String,
}

impl LastOperation {
    pub fn new(state: LastOperationState, description: impl Into<String>) -> Self {
        Self {
            state,
            description: description.into(),
        }
    }
}

/// Per-request context passed to every broker call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Value of the first `X-*-Region` header on the request, if any
    pub region: Option<String>,
}

impl RequestContext {
    /// Context for a request routed to a region
    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
        }
    }
}
