//! Shared helpers for the HTTP integration tests
//!
//! `FakeBroker` records every call it receives and keeps just enough state to
//! report conflicts and missing instances/bindings. Requests are driven
//! through the router in process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use servicebroker_api::{create_router, AppState, BrokerCredentials, MemorySink};
use servicebroker_core::{
    Binding, BrokerError, Catalog, LastOperation, LastOperationState, ProvisionOutcome,
    ProvisionedInstance, ProvisioningMode, RequestContext, Result, Service, ServiceBroker,
    ServiceDashboardClient, ServiceDetails, ServiceMetadata, ServicePlan, ServicePlanMetadata,
};

pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";

pub const DASHBOARD_URL: &str = "https://dashboard.example.com";

// =============================================================================
// Fake broker
// =============================================================================

/// Everything the fake has been asked to do
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub broker_called: bool,
    pub provisioned_ids: Vec<String>,
    pub provision_details: Vec<ServiceDetails>,
    pub async_provisioned_ids: Vec<String>,
    pub deprovisioned_ids: Vec<String>,
    pub bound: Vec<(String, String)>,
    pub unbound: Vec<(String, String)>,
    pub last_operation_ids: Vec<String>,
    pub contexts: Vec<RequestContext>,
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Calls,
    instances: HashSet<String>,
    bindings: HashSet<(String, String)>,
}

/// Recording broker with injectable failures
#[derive(Debug, Default)]
pub struct FakeBroker {
    mode: ProvisioningMode,
    instance_limit: Option<usize>,
    async_completes: bool,
    catalog_error: Option<BrokerError>,
    provision_error: Option<BrokerError>,
    deprovision_error: Option<BrokerError>,
    bind_error: Option<BrokerError>,
    unbind_error: Option<BrokerError>,
    last_operation_error: Option<BrokerError>,
    state: Mutex<FakeState>,
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ProvisioningMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_instance_limit(mut self, limit: usize) -> Self {
        self.instance_limit = Some(limit);
        self
    }

    /// Asynchronous provisions finish immediately instead of going pending
    pub fn completing_async(mut self) -> Self {
        self.async_completes = true;
        self
    }

    pub fn failing_catalog(mut self, err: BrokerError) -> Self {
        self.catalog_error = Some(err);
        self
    }

    pub fn failing_provision(mut self, err: BrokerError) -> Self {
        self.provision_error = Some(err);
        self
    }

    pub fn failing_deprovision(mut self, err: BrokerError) -> Self {
        self.deprovision_error = Some(err);
        self
    }

    pub fn failing_bind(mut self, err: BrokerError) -> Self {
        self.bind_error = Some(err);
        self
    }

    pub fn failing_unbind(mut self, err: BrokerError) -> Self {
        self.unbind_error = Some(err);
        self
    }

    pub fn failing_last_operation(mut self, err: BrokerError) -> Self {
        self.last_operation_error = Some(err);
        self
    }

    /// Seed an instance as if it had been provisioned earlier
    pub fn with_instance(self, instance_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .instances
            .insert(instance_id.to_string());
        self
    }

    /// Seed a binding as if it had been created earlier
    pub fn with_binding(self, instance_id: &str, binding_id: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.instances.insert(instance_id.to_string());
            state
                .bindings
                .insert((instance_id.to_string(), binding_id.to_string()));
        }
        self
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, ctx: &RequestContext) {
        let mut state = self.state.lock().unwrap();
        state.calls.broker_called = true;
        state.calls.contexts.push(ctx.clone());
    }

    fn create_instance(&self, instance_id: &str, details: &ServiceDetails) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        if state.instances.contains(instance_id) {
            return Err(BrokerError::InstanceAlreadyExists);
        }
        if let Some(limit) = self.instance_limit {
            if state.instances.len() >= limit {
                return Err(BrokerError::InstanceLimitReached);
            }
        }

        state.instances.insert(instance_id.to_string());
        state.calls.provision_details.push(details.clone());
        Ok(())
    }
}

#[async_trait]
impl ServiceBroker for FakeBroker {
    fn provisioning_mode(&self) -> ProvisioningMode {
        self.mode
    }

    async fn services(&self, ctx: &RequestContext) -> Result<Catalog> {
        self.record(ctx);
        match &self.catalog_error {
            Some(err) => Err(err.clone()),
            None => Ok(fake_catalog()),
        }
    }

    async fn provision(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ServiceDetails,
    ) -> Result<ProvisionedInstance> {
        self.record(ctx);
        if let Some(err) = &self.provision_error {
            return Err(err.clone());
        }

        self.create_instance(instance_id, &details)?;
        self.state
            .lock()
            .unwrap()
            .calls
            .provisioned_ids
            .push(instance_id.to_string());
        Ok(ProvisionedInstance::with_dashboard(DASHBOARD_URL))
    }

    async fn provision_async(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ServiceDetails,
    ) -> Result<ProvisionOutcome> {
        self.record(ctx);
        if let Some(err) = &self.provision_error {
            return Err(err.clone());
        }

        self.create_instance(instance_id, &details)?;
        self.state
            .lock()
            .unwrap()
            .calls
            .async_provisioned_ids
            .push(instance_id.to_string());

        if self.async_completes {
            Ok(ProvisionOutcome::Completed(ProvisionedInstance::with_dashboard(
                DASHBOARD_URL,
            )))
        } else {
            Ok(ProvisionOutcome::Pending)
        }
    }

    async fn deprovision(&self, ctx: &RequestContext, instance_id: &str) -> Result<()> {
        self.record(ctx);
        if let Some(err) = &self.deprovision_error {
            return Err(err.clone());
        }

        let mut state = self.state.lock().unwrap();
        if !state.instances.remove(instance_id) {
            return Err(BrokerError::InstanceDoesNotExist);
        }
        state.calls.deprovisioned_ids.push(instance_id.to_string());
        Ok(())
    }

    async fn last_operation(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
    ) -> Result<LastOperation> {
        self.record(ctx);
        self.state
            .lock()
            .unwrap()
            .calls
            .last_operation_ids
            .push(instance_id.to_string());

        match &self.last_operation_error {
            Some(err) => Err(err.clone()),
            None => Ok(LastOperation::new(
                LastOperationState::Succeeded,
                "Provisioning complete",
            )),
        }
    }

    async fn bind(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
    ) -> Result<Binding> {
        self.record(ctx);
        if let Some(err) = &self.bind_error {
            return Err(err.clone());
        }

        let mut state = self.state.lock().unwrap();
        if !state.instances.contains(instance_id) {
            return Err(BrokerError::InstanceDoesNotExist);
        }
        let key = (instance_id.to_string(), binding_id.to_string());
        if !state.bindings.insert(key.clone()) {
            return Err(BrokerError::BindingAlreadyExists);
        }
        state.calls.bound.push(key);

        Ok(Binding {
            credentials: json!({
                "host": "127.0.0.1",
                "port": 3000,
                "username": "batman",
                "password": "robin"
            }),
            syslog_drain_url: Some("syslog://example.com".into()),
        })
    }

    async fn unbind(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
    ) -> Result<()> {
        self.record(ctx);
        if let Some(err) = &self.unbind_error {
            return Err(err.clone());
        }

        let mut state = self.state.lock().unwrap();
        if !state.instances.contains(instance_id) {
            return Err(BrokerError::InstanceDoesNotExist);
        }
        let key = (instance_id.to_string(), binding_id.to_string());
        if !state.bindings.remove(&key) {
            return Err(BrokerError::BindingDoesNotExist);
        }
        state.calls.unbound.push(key);
        Ok(())
    }
}

/// Catalog reported by the fake; `fixtures/catalog.json` is its wire form
pub fn fake_catalog() -> Catalog {
    Catalog::new(vec![Service {
        id: "0A789746-B251-4BDA-A2A8-59E03C3A3F79".into(),
        name: "p-cassandra".into(),
        description: "Cassandra service for application development and testing".into(),
        bindable: true,
        tags: vec!["cassandra".into(), "nosql".into()],
        plan_updateable: Some(false),
        plans: vec![ServicePlan {
            id: "ABE176EE-F69F-4A96-80CE-142595CC24E3".into(),
            name: "default".into(),
            description: "The default Cassandra plan".into(),
            free: Some(true),
            metadata: Some(ServicePlanMetadata {
                display_name: Some("Cassandra".into()),
                bullets: vec!["Shared cluster".into()],
            }),
        }],
        requires: vec!["syslog_drain".into()],
        metadata: Some(ServiceMetadata {
            display_name: Some("Cassandra".into()),
            long_description: Some("Long description".into()),
            documentation_url: Some("http://thedocs.com".into()),
            support_url: Some("http://helpme.no".into()),
            ..Default::default()
        }),
        dashboard_client: Some(ServiceDashboardClient {
            id: "cassandra-dashboard".into(),
            secret: "dashboard-secret".into(),
            redirect_uri: DASHBOARD_URL.into(),
        }),
    }])
}

// =============================================================================
// Router and requests
// =============================================================================

/// Router in front of the fake, plus the sink its events land in
pub fn app(broker: Arc<FakeBroker>) -> (Router, Arc<MemorySink>) {
    let events = Arc::new(MemorySink::new());
    let state = Arc::new(AppState::new(
        broker,
        BrokerCredentials::new(USERNAME, PASSWORD),
        events.clone(),
    ));
    (create_router(state), events)
}

pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Authenticated request without a body
pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(USERNAME, PASSWORD))
        .body(Body::empty())
        .unwrap()
}

/// Authenticated request with a raw body
pub fn request_with_body(method: Method, uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(USERNAME, PASSWORD))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn provision_request(instance_id: &str, query: &str, details: &ServiceDetails) -> Request<Body> {
    request_with_body(
        Method::PUT,
        &format!("/v2/service_instances/{}{}", instance_id, query),
        serde_json::to_string(details).unwrap(),
    )
}

pub fn default_details() -> ServiceDetails {
    ServiceDetails::new("service-id", "plan-id").in_space("organization-guid", "space-guid")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Run one request through the router and decode the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}
