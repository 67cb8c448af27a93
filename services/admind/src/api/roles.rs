//! Role API handlers.
//!
//! # Purpose
//! Implements role CRUD plus the grant/revoke endpoints and the assembled
//! permissions projection for a role.
use crate::api::ensure_role_exists;
use crate::api::error::{ApiError, api_conflict, api_internal, api_not_found};
use crate::api::types::{RoleCreateRequest, RoleListResponse, RoleUpdateRequest};
use crate::app::AppState;
use crate::auth::rbac::assemble_role_permissions;
use crate::model::{Role, RolePermissions};
use crate::store::StoreError;
use atrium_common::ids::{ActionId, RoleId};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/v1/roles",
    tag = "roles",
    responses(
        (status = 200, description = "List roles", body = RoleListResponse)
    )
)]
pub(crate) async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<RoleListResponse>, ApiError> {
    let items = state
        .store
        .list_roles()
        .await
        .map_err(|err| api_internal("failed to list roles", &err))?;
    Ok(Json(RoleListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/roles",
    tag = "roles",
    request_body = RoleCreateRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 409, description = "Role name taken", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_role(
    State(state): State<AppState>,
    Json(body): Json<RoleCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = Role {
        id: RoleId::new(),
        name: body.name,
    };
    match state.store.create_role(role).await {
        Ok(role) => Ok((StatusCode::CREATED, Json(role))),
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", "role name taken")),
        Err(err) => Err(api_internal("failed to create role", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/roles/{role_id}",
    tag = "roles",
    params(("role_id" = RoleId, Path, description = "Role identifier")),
    responses(
        (status = 200, description = "Role", body = Role),
        (status = 404, description = "Role not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_role(
    Path(role_id): Path<RoleId>,
    State(state): State<AppState>,
) -> Result<Json<Role>, ApiError> {
    let role = state
        .store
        .get_role(role_id)
        .await
        .map_err(|err| api_internal("failed to load role", &err))?
        .ok_or_else(|| api_not_found("role not found"))?;
    Ok(Json(role))
}

#[utoipa::path(
    put,
    path = "/v1/roles/{role_id}",
    tag = "roles",
    params(("role_id" = RoleId, Path, description = "Role identifier")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 404, description = "Role not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Role name taken", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_role(
    Path(role_id): Path<RoleId>,
    State(state): State<AppState>,
    Json(body): Json<RoleUpdateRequest>,
) -> Result<Json<Role>, ApiError> {
    let role = Role {
        id: role_id,
        name: body.name,
    };
    match state.store.update_role(role).await {
        Ok(role) => Ok(Json(role)),
        Err(StoreError::NotFound(_)) => Err(api_not_found("role not found")),
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", "role name taken")),
        Err(err) => Err(api_internal("failed to update role", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/roles/{role_id}",
    tag = "roles",
    params(("role_id" = RoleId, Path, description = "Role identifier")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_role(
    Path(role_id): Path<RoleId>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete_role(role_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(api_not_found("role not found")),
        Err(err) => Err(api_internal("failed to delete role", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/roles/{role_id}/permissions",
    tag = "roles",
    params(("role_id" = RoleId, Path, description = "Role identifier")),
    responses(
        (status = 200, description = "Assembled access matrix for the role", body = RolePermissions),
        (status = 404, description = "Role not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn role_permissions(
    Path(role_id): Path<RoleId>,
    State(state): State<AppState>,
) -> Result<Json<RolePermissions>, ApiError> {
    let role = state
        .store
        .get_role(role_id)
        .await
        .map_err(|err| api_internal("failed to load role", &err))?
        .ok_or_else(|| api_not_found("role not found"))?;
    let grants = state
        .store
        .role_grants(role_id)
        .await
        .map_err(|err| api_internal("failed to load grants", &err))?;
    Ok(Json(assemble_role_permissions(role, grants)))
}

#[utoipa::path(
    put,
    path = "/v1/roles/{role_id}/permissions/{action_id}",
    tag = "roles",
    params(
        ("role_id" = RoleId, Path, description = "Role identifier"),
        ("action_id" = ActionId, Path, description = "Action identifier")
    ),
    responses(
        (status = 204, description = "Action granted"),
        (status = 404, description = "Role or action not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn grant_action(
    Path((role_id, action_id)): Path<(RoleId, ActionId)>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.grant_action(role_id, action_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(what)) => Err(api_not_found(&format!("{what} not found"))),
        Err(err) => Err(api_internal("failed to grant action", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/roles/{role_id}/permissions/{action_id}",
    tag = "roles",
    params(
        ("role_id" = RoleId, Path, description = "Role identifier"),
        ("action_id" = ActionId, Path, description = "Action identifier")
    ),
    responses(
        (status = 204, description = "Action revoked"),
        (status = 404, description = "Grant not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn revoke_action(
    Path((role_id, action_id)): Path<(RoleId, ActionId)>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    ensure_role_exists(&state, role_id).await?;
    match state.store.revoke_action(role_id, action_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(api_not_found("grant not found")),
        Err(err) => Err(api_internal("failed to revoke action", &err)),
    }
}
