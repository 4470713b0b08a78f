//! Instance lifecycle handlers
//!
//! Provisioning is the only operation with sync/async negotiation. The
//! handler flow is:
//!
//! 1. Decode the service details (a malformed body never reaches the broker)
//! 2. Ask the broker for its provisioning mode
//! 3. Refuse synchronous callers of an async-only broker with AsyncRequired
//! 4. Otherwise call the synchronous or asynchronous provision
//! 5. Render Completed as 201, Pending as 202, failures per the error table

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use servicebroker_core::{
    BrokerError, ProvisionOutcome, ProvisioningMode, RequestContext, ServiceDetails,
};

use crate::api::codec;
use crate::api::error::{ApiError, Operation};
use crate::api::handlers::broker_failure;
use crate::api::AppState;

/// Provision a service instance
///
/// PUT /v2/service_instances/{instance_id}[?accepts_incomplete=true]
pub async fn provision(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let Path(instance_id) = path?;
    let Query(query) = query?;
    let body = body?;

    let log = state
        .logger(Operation::Provision)
        .with("instance-id", instance_id.as_str());

    let details = codec::decode_service_details(&body).map_err(|err| {
        log.error("invalid-service-details", &err);
        ApiError::from(err)
    })?;
    let accepts_incomplete = codec::accepts_incomplete(&query);

    let outcome = dispatch_provision(&state, &ctx, &instance_id, details, accepts_incomplete)
        .await
        .map_err(|err| broker_failure(&log, err))?;

    Ok(match outcome {
        ProvisionOutcome::Completed(instance) => (StatusCode::CREATED, Json(instance)).into_response(),
        ProvisionOutcome::Pending => (StatusCode::ACCEPTED, Json(json!({}))).into_response(),
    })
}

/// Pick the broker call matching its mode and the caller's opt-in
async fn dispatch_provision(
    state: &AppState,
    ctx: &RequestContext,
    instance_id: &str,
    details: ServiceDetails,
    accepts_incomplete: bool,
) -> Result<ProvisionOutcome, BrokerError> {
    match (state.broker.provisioning_mode(), accepts_incomplete) {
        (ProvisioningMode::AsynchronousOnly, false) => Err(BrokerError::AsyncRequired),
        (ProvisioningMode::Synchronous, _) | (_, false) => state
            .broker
            .provision(ctx, instance_id, details)
            .await
            .map(ProvisionOutcome::Completed),
        (_, true) => state.broker.provision_async(ctx, instance_id, details).await,
    }
}

/// Deprovision a service instance
///
/// DELETE /v2/service_instances/{instance_id}
pub async fn deprovision(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(instance_id) = path?;
    let log = state
        .logger(Operation::Deprovision)
        .with("instance-id", instance_id.as_str());

    state
        .broker
        .deprovision(&ctx, &instance_id)
        .await
        .map_err(|err| broker_failure(&log, err))?;

    Ok(Json(json!({})))
}
