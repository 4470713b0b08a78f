//! Last operation polling handler

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension, Json,
};
use std::sync::Arc;

use servicebroker_core::{LastOperation, RequestContext};

use crate::api::error::{ApiError, Operation};
use crate::api::handlers::broker_failure;
use crate::api::AppState;

/// Report the state of the last operation on an instance
///
/// GET /v2/service_instances/{instance_id}/last_operation
///
/// Always records a start event; a successful check also records a done
/// event carrying the reported state.
pub async fn last_operation(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<LastOperation>, ApiError> {
    let Path(instance_id) = path?;
    let log = state
        .logger(Operation::LastOperation)
        .with("instance-id", instance_id.as_str());

    log.info("starting-check-for-operation", &[]);

    let operation = state
        .broker
        .last_operation(&ctx, &instance_id)
        .await
        .map_err(|err| broker_failure(&log, err))?;

    log.info(
        "done-check-for-operation",
        &[("state", operation.state.as_str())],
    );

    Ok(Json(operation))
}
