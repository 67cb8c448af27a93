//! User API handlers.
//!
//! # Purpose
//! Implements user CRUD, role assignment, and per-user session endpoints
//! with consistent error mapping for store conflicts and missing records.
use crate::api::ensure_user_exists;
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_internal_message, api_not_found,
};
use crate::api::types::{
    RoleListResponse, SessionListResponse, SessionsDeletedResponse, UserCreateRequest,
    UserListResponse, UserRolesRequest, UserUpdateRequest,
};
use crate::app::AppState;
use crate::auth::password::hash_password;
use crate::model::User;
use crate::store::StoreError;
use atrium_common::ids::UserId;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "List users", body = UserListResponse)
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    let items = state
        .store
        .list_users()
        .await
        .map_err(|err| api_internal("failed to list users", &err))?;
    Ok(Json(UserListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "users",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already taken", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<UserCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = hash_password(&body.password).map_err(|err| {
        tracing::error!(error = ?err, "failed to hash password");
        api_internal_message("failed to hash password")
    })?;
    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        email: body.email,
        display_name: body.display_name,
        created_at: now,
        updated_at: now,
    };
    match state.store.create_user(user, password_hash).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", "email already taken")),
        Err(err) => Err(api_internal("failed to create user", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = UserId, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_user(
    Path(user_id): Path<UserId>,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .get_user(user_id)
        .await
        .map_err(|err| api_internal("failed to load user", &err))?
        .ok_or_else(|| api_not_found("user not found"))?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = UserId, Path, description = "User identifier")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Email already taken", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_user(
    Path(user_id): Path<UserId>,
    State(state): State<AppState>,
    Json(body): Json<UserUpdateRequest>,
) -> Result<Json<User>, ApiError> {
    // Full-record update: load the current record, replace the mutable
    // fields, keep the creation timestamp.
    let existing = state
        .store
        .get_user(user_id)
        .await
        .map_err(|err| api_internal("failed to load user", &err))?
        .ok_or_else(|| api_not_found("user not found"))?;
    let password_hash = match body.password {
        Some(password) => Some(hash_password(&password).map_err(|err| {
            tracing::error!(error = ?err, "failed to hash password");
            api_internal_message("failed to hash password")
        })?),
        None => None,
    };
    let user = User {
        id: existing.id,
        email: body.email,
        display_name: body.display_name,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };
    match state.store.update_user(user, password_hash).await {
        Ok(user) => Ok(Json(user)),
        Err(StoreError::NotFound(_)) => Err(api_not_found("user not found")),
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", "email already taken")),
        Err(err) => Err(api_internal("failed to update user", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = UserId, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "User still authors articles", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_user(
    Path(user_id): Path<UserId>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete_user(user_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(api_not_found("user not found")),
        Err(StoreError::Conflict(_)) => {
            Err(api_conflict("in_use", "user still authors articles"))
        }
        Err(err) => Err(api_internal("failed to delete user", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/roles",
    tag = "users",
    params(("user_id" = UserId, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Roles assigned to the user", body = RoleListResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_user_roles(
    Path(user_id): Path<UserId>,
    State(state): State<AppState>,
) -> Result<Json<RoleListResponse>, ApiError> {
    ensure_user_exists(&state, user_id).await?;
    let items = state
        .store
        .list_user_roles(user_id)
        .await
        .map_err(|err| api_internal("failed to list user roles", &err))?;
    Ok(Json(RoleListResponse { items }))
}

#[utoipa::path(
    put,
    path = "/v1/users/{user_id}/roles",
    tag = "users",
    params(("user_id" = UserId, Path, description = "User identifier")),
    request_body = UserRolesRequest,
    responses(
        (status = 204, description = "Role set replaced"),
        (status = 404, description = "User or role not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn set_user_roles(
    Path(user_id): Path<UserId>,
    State(state): State<AppState>,
    Json(body): Json<UserRolesRequest>,
) -> Result<StatusCode, ApiError> {
    match state.store.set_user_roles(user_id, body.roles).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(what)) => Err(api_not_found(&format!("{what} not found"))),
        Err(err) => Err(api_internal("failed to set user roles", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/sessions",
    tag = "sessions",
    params(("user_id" = UserId, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Sessions owned by the user", body = SessionListResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_user_sessions(
    Path(user_id): Path<UserId>,
    State(state): State<AppState>,
) -> Result<Json<SessionListResponse>, ApiError> {
    ensure_user_exists(&state, user_id).await?;
    let items = state
        .store
        .list_sessions_by_user(user_id)
        .await
        .map_err(|err| api_internal("failed to list sessions", &err))?;
    Ok(Json(SessionListResponse { items }))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{user_id}/sessions",
    tag = "sessions",
    params(("user_id" = UserId, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Sessions removed", body = SessionsDeletedResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_user_sessions(
    Path(user_id): Path<UserId>,
    State(state): State<AppState>,
) -> Result<Json<SessionsDeletedResponse>, ApiError> {
    ensure_user_exists(&state, user_id).await?;
    let deleted = state
        .store
        .delete_sessions_by_user(user_id)
        .await
        .map_err(|err| api_internal("failed to delete sessions", &err))?;
    Ok(Json(SessionsDeletedResponse { deleted }))
}
