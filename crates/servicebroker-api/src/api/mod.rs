//! HTTP plane of the service broker API

pub mod auth;
pub mod codec;
pub mod context;
pub mod error;
pub mod handlers;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use servicebroker_core::ServiceBroker;

use crate::logging::{EventLogger, EventSink};
use auth::{BrokerCredentials, CredentialGate};
use error::Operation;

/// Application state shared across handlers
///
/// Built once at startup and never mutated.
pub struct AppState {
    /// Broker every operation is delegated to
    pub broker: Arc<dyn ServiceBroker>,
    /// Basic-auth gate in front of every route
    pub gate: CredentialGate,
    /// Destination of protocol events
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    pub fn new(
        broker: Arc<dyn ServiceBroker>,
        credentials: BrokerCredentials,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            broker,
            gate: CredentialGate::new(credentials),
            events,
        }
    }

    /// Event logger for one operation of one request
    pub fn logger(&self, operation: Operation) -> EventLogger<'_> {
        EventLogger::new(self.events.as_ref(), operation)
    }
}

/// Unknown paths, reached only after authentication
async fn route_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

/// Known paths called with a method they do not serve
async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (StatusCode::METHOD_NOT_ALLOWED, Json(json!({})))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v2/catalog", get(handlers::catalog))
        .route(
            "/v2/service_instances/{instance_id}",
            put(handlers::provision).delete(handlers::deprovision),
        )
        .route(
            "/v2/service_instances/{instance_id}/last_operation",
            get(handlers::last_operation),
        )
        .route(
            "/v2/service_instances/{instance_id}/service_bindings/{binding_id}",
            put(handlers::bind).delete(handlers::unbind),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        // Middleware; the last layer added runs first
        .layer(middleware::from_fn(context::attach_request_context))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
