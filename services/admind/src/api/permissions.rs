//! Permission resource/action API handlers.
//!
//! # Purpose
//! Implements CRUD for the normalized halves of the access-control matrix:
//! protectable resources and the actions scoped to them.
use crate::api::ensure_resource_exists;
use crate::api::error::{ApiError, api_conflict, api_internal, api_not_found};
use crate::api::types::{
    ActionCreateRequest, ActionListResponse, ActionUpdateRequest, ResourceCreateRequest,
    ResourceListResponse, ResourceUpdateRequest,
};
use crate::app::AppState;
use crate::model::{PermissionAction, PermissionResource};
use crate::store::StoreError;
use atrium_common::ids::{ActionId, ResourceId};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/v1/permission-resources",
    tag = "permissions",
    responses(
        (status = 200, description = "List permission resources", body = ResourceListResponse)
    )
)]
pub(crate) async fn list_resources(
    State(state): State<AppState>,
) -> Result<Json<ResourceListResponse>, ApiError> {
    let items = state
        .store
        .list_resources()
        .await
        .map_err(|err| api_internal("failed to list resources", &err))?;
    Ok(Json(ResourceListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/permission-resources",
    tag = "permissions",
    request_body = ResourceCreateRequest,
    responses(
        (status = 201, description = "Resource created", body = PermissionResource),
        (status = 409, description = "Resource name taken", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_resource(
    State(state): State<AppState>,
    Json(body): Json<ResourceCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let resource = PermissionResource {
        id: ResourceId::new(),
        name: body.name,
    };
    match state.store.create_resource(resource).await {
        Ok(resource) => Ok((StatusCode::CREATED, Json(resource))),
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", "resource name taken")),
        Err(err) => Err(api_internal("failed to create resource", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/permission-resources/{resource_id}",
    tag = "permissions",
    params(("resource_id" = ResourceId, Path, description = "Resource identifier")),
    responses(
        (status = 200, description = "Resource", body = PermissionResource),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_resource(
    Path(resource_id): Path<ResourceId>,
    State(state): State<AppState>,
) -> Result<Json<PermissionResource>, ApiError> {
    let resource = state
        .store
        .get_resource(resource_id)
        .await
        .map_err(|err| api_internal("failed to load resource", &err))?
        .ok_or_else(|| api_not_found("resource not found"))?;
    Ok(Json(resource))
}

#[utoipa::path(
    put,
    path = "/v1/permission-resources/{resource_id}",
    tag = "permissions",
    params(("resource_id" = ResourceId, Path, description = "Resource identifier")),
    request_body = ResourceUpdateRequest,
    responses(
        (status = 200, description = "Resource updated", body = PermissionResource),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Resource name taken", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_resource(
    Path(resource_id): Path<ResourceId>,
    State(state): State<AppState>,
    Json(body): Json<ResourceUpdateRequest>,
) -> Result<Json<PermissionResource>, ApiError> {
    let resource = PermissionResource {
        id: resource_id,
        name: body.name,
    };
    match state.store.update_resource(resource).await {
        Ok(resource) => Ok(Json(resource)),
        Err(StoreError::NotFound(_)) => Err(api_not_found("resource not found")),
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", "resource name taken")),
        Err(err) => Err(api_internal("failed to update resource", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/permission-resources/{resource_id}",
    tag = "permissions",
    params(("resource_id" = ResourceId, Path, description = "Resource identifier")),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_resource(
    Path(resource_id): Path<ResourceId>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete_resource(resource_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(api_not_found("resource not found")),
        Err(err) => Err(api_internal("failed to delete resource", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/permission-resources/{resource_id}/actions",
    tag = "permissions",
    params(("resource_id" = ResourceId, Path, description = "Resource identifier")),
    responses(
        (status = 200, description = "Actions scoped to the resource", body = ActionListResponse),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_actions(
    Path(resource_id): Path<ResourceId>,
    State(state): State<AppState>,
) -> Result<Json<ActionListResponse>, ApiError> {
    ensure_resource_exists(&state, resource_id).await?;
    let items = state
        .store
        .list_actions(resource_id)
        .await
        .map_err(|err| api_internal("failed to list actions", &err))?;
    Ok(Json(ActionListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/permission-resources/{resource_id}/actions",
    tag = "permissions",
    params(("resource_id" = ResourceId, Path, description = "Resource identifier")),
    request_body = ActionCreateRequest,
    responses(
        (status = 201, description = "Action created", body = PermissionAction),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Action name taken for this resource", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_action(
    Path(resource_id): Path<ResourceId>,
    State(state): State<AppState>,
    Json(body): Json<ActionCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let action = PermissionAction {
        id: ActionId::new(),
        resource_id,
        name: body.name,
    };
    match state.store.create_action(action).await {
        Ok(action) => Ok((StatusCode::CREATED, Json(action))),
        Err(StoreError::NotFound(_)) => Err(api_not_found("resource not found")),
        Err(StoreError::Conflict(_)) => Err(api_conflict(
            "already_exists",
            "action name taken for this resource",
        )),
        Err(err) => Err(api_internal("failed to create action", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/permission-actions/{action_id}",
    tag = "permissions",
    params(("action_id" = ActionId, Path, description = "Action identifier")),
    responses(
        (status = 200, description = "Action", body = PermissionAction),
        (status = 404, description = "Action not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_action(
    Path(action_id): Path<ActionId>,
    State(state): State<AppState>,
) -> Result<Json<PermissionAction>, ApiError> {
    let action = state
        .store
        .get_action(action_id)
        .await
        .map_err(|err| api_internal("failed to load action", &err))?
        .ok_or_else(|| api_not_found("action not found"))?;
    Ok(Json(action))
}

#[utoipa::path(
    put,
    path = "/v1/permission-actions/{action_id}",
    tag = "permissions",
    params(("action_id" = ActionId, Path, description = "Action identifier")),
    request_body = ActionUpdateRequest,
    responses(
        (status = 200, description = "Action updated", body = PermissionAction),
        (status = 404, description = "Action or resource not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Action name taken for this resource", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_action(
    Path(action_id): Path<ActionId>,
    State(state): State<AppState>,
    Json(body): Json<ActionUpdateRequest>,
) -> Result<Json<PermissionAction>, ApiError> {
    let action = PermissionAction {
        id: action_id,
        resource_id: body.resource_id,
        name: body.name,
    };
    match state.store.update_action(action).await {
        Ok(action) => Ok(Json(action)),
        Err(StoreError::NotFound(what)) => Err(api_not_found(&format!("{what} not found"))),
        Err(StoreError::Conflict(_)) => Err(api_conflict(
            "already_exists",
            "action name taken for this resource",
        )),
        Err(err) => Err(api_internal("failed to update action", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/permission-actions/{action_id}",
    tag = "permissions",
    params(("action_id" = ActionId, Path, description = "Action identifier")),
    responses(
        (status = 204, description = "Action deleted"),
        (status = 404, description = "Action not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_action(
    Path(action_id): Path<ActionId>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete_action(action_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(api_not_found("action not found")),
        Err(err) => Err(api_internal("failed to delete action", &err)),
    }
}
