//! Session API handlers.
//!
//! # Purpose
//! Implements the refresh-token session lifecycle: credential-checked
//! creation, lookup by id or refresh token, and deletion.
//!
//! # Security considerations
//! - Refresh tokens are secrets; lookups carry them in request bodies, and
//!   they must never appear in logs or URLs.
//! - Credential failures return a uniform 401 regardless of whether the
//!   email or the password was wrong.
use crate::api::error::{ApiError, api_conflict, api_internal, api_not_found, api_unauthorized};
use crate::api::types::{SessionCreateRequest, SessionLookupRequest};
use crate::app::AppState;
use crate::auth::password::verify_password;
use crate::model::UserSession;
use crate::store::StoreError;
use atrium_common::ids::SessionId;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use uuid::Uuid;

fn generate_refresh_token() -> String {
    // Two v4 UUIDs worth of entropy; opaque to clients.
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[utoipa::path(
    post,
    path = "/v1/sessions",
    tag = "sessions",
    request_body = SessionCreateRequest,
    responses(
        (status = 201, description = "Session created", body = UserSession),
        (status = 401, description = "Invalid credentials", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<SessionCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .find_user_by_email(&body.email)
        .await
        .map_err(|err| api_internal("failed to load user", &err))?
        .ok_or_else(|| api_unauthorized("invalid credentials"))?;
    let hash = state
        .store
        .user_password_hash(user.id)
        .await
        .map_err(|err| api_internal("failed to load credentials", &err))?
        .ok_or_else(|| api_unauthorized("invalid credentials"))?;
    if !verify_password(&body.password, &hash) {
        return Err(api_unauthorized("invalid credentials"));
    }

    let now = Utc::now();
    let session = UserSession {
        id: SessionId::new(),
        user_id: user.id,
        refresh_token: generate_refresh_token(),
        created_at: now,
        expires_at: now + state.session_ttl,
    };
    match state.store.create_session(session).await {
        Ok(session) => Ok((StatusCode::CREATED, Json(session))),
        Err(StoreError::Conflict(_)) => {
            Err(api_conflict("already_exists", "session already exists"))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found("user not found")),
        Err(err) => Err(api_internal("failed to create session", &err)),
    }
}

#[utoipa::path(
    post,
    path = "/v1/sessions/lookup",
    tag = "sessions",
    request_body = SessionLookupRequest,
    responses(
        (status = 200, description = "Session matching the refresh token", body = UserSession),
        (status = 404, description = "No session matches", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn lookup_session(
    State(state): State<AppState>,
    Json(body): Json<SessionLookupRequest>,
) -> Result<Json<UserSession>, ApiError> {
    let session = state
        .store
        .find_session_by_refresh_token(&body.refresh_token)
        .await
        .map_err(|err| api_internal("failed to look up session", &err))?
        .ok_or_else(|| api_not_found("session not found"))?;
    Ok(Json(session))
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = SessionId, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session", body = UserSession),
        (status = 404, description = "Session not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_session(
    Path(session_id): Path<SessionId>,
    State(state): State<AppState>,
) -> Result<Json<UserSession>, ApiError> {
    let session = state
        .store
        .get_session(session_id)
        .await
        .map_err(|err| api_internal("failed to load session", &err))?
        .ok_or_else(|| api_not_found("session not found"))?;
    Ok(Json(session))
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = SessionId, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_session(
    Path(session_id): Path<SessionId>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete_session(session_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(api_not_found("session not found")),
        Err(err) => Err(api_internal("failed to delete session", &err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_opaque_and_distinct() {
        let first = generate_refresh_token();
        let second = generate_refresh_token();
        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
