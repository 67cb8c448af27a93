//! System API handlers.
//!
//! # Purpose
//! Exposes service identity and health endpoints used by deployment probes
//! and clients negotiating features.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::{FeatureFlags, HealthStatus, SystemInfo};
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/v1/system/info",
    tag = "system",
    responses(
        (status = 200, description = "Service identity and features", body = SystemInfo)
    )
)]
pub(crate) async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    Json(SystemInfo {
        api_version: state.api_version.clone(),
        backend: state.store.backend_name().to_string(),
        features: FeatureFlags {
            durable_storage: state.store.is_durable(),
        },
    })
}

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 500, description = "Storage backend unreachable", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    state
        .store
        .health_check()
        .await
        .map_err(|err| api_internal("storage backend unhealthy", &err))?;
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}
