//! Catalog handler

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use servicebroker_core::{Catalog, RequestContext};

use crate::api::error::{ApiError, Operation};
use crate::api::handlers::broker_failure;
use crate::api::AppState;

/// Services and plans offered by the broker, serialized verbatim
///
/// GET /v2/catalog
pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Catalog>, ApiError> {
    let log = state.logger(Operation::Catalog);

    let catalog = state
        .broker
        .services(&ctx)
        .await
        .map_err(|err| broker_failure(&log, err))?;

    Ok(Json(catalog))
}
