//! Binding handlers

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use servicebroker_core::{Binding, RequestContext};

use crate::api::error::{ApiError, Operation};
use crate::api::handlers::broker_failure;
use crate::api::AppState;

/// Bind an application to an instance and return the broker's credentials
///
/// PUT /v2/service_instances/{instance_id}/service_bindings/{binding_id}
pub async fn bind(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<(StatusCode, Json<Binding>), ApiError> {
    let Path((instance_id, binding_id)) = path?;
    let log = state
        .logger(Operation::Bind)
        .with("instance-id", instance_id.as_str())
        .with("binding-id", binding_id.as_str());

    let binding = state
        .broker
        .bind(&ctx, &instance_id, &binding_id)
        .await
        .map_err(|err| broker_failure(&log, err))?;

    Ok((StatusCode::CREATED, Json(binding)))
}

/// Remove a binding
///
/// DELETE /v2/service_instances/{instance_id}/service_bindings/{binding_id}
pub async fn unbind(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path((instance_id, binding_id)) = path?;
    let log = state
        .logger(Operation::Unbind)
        .with("instance-id", instance_id.as_str())
        .with("binding-id", binding_id.as_str());

    state
        .broker
        .unbind(&ctx, &instance_id, &binding_id)
        .await
        .map_err(|err| broker_failure(&log, err))?;

    Ok(Json(json!({})))
}
