//! Admin HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and shared helper functions for validating
//! entity existence.
pub mod articles;
pub mod error;
pub mod openapi;
pub mod permissions;
pub mod roles;
pub mod sessions;
pub mod system;
pub mod types;
pub mod users;

use crate::api::error::{ApiError, api_internal, api_not_found};
use crate::app::AppState;
use atrium_common::ids::{ResourceId, RoleId, UserId};

pub(crate) async fn ensure_user_exists(state: &AppState, id: UserId) -> Result<(), ApiError> {
    let exists = state
        .store
        .user_exists(id)
        .await
        .map_err(|err| api_internal("failed to check user existence", &err))?;
    if !exists {
        return Err(api_not_found("user not found"));
    }
    Ok(())
}

pub(crate) async fn ensure_role_exists(state: &AppState, id: RoleId) -> Result<(), ApiError> {
    let exists = state
        .store
        .get_role(id)
        .await
        .map_err(|err| api_internal("failed to check role existence", &err))?
        .is_some();
    if !exists {
        return Err(api_not_found("role not found"));
    }
    Ok(())
}

pub(crate) async fn ensure_resource_exists(
    state: &AppState,
    id: ResourceId,
) -> Result<(), ApiError> {
    let exists = state
        .store
        .get_resource(id)
        .await
        .map_err(|err| api_internal("failed to check resource existence", &err))?
        .is_some();
    if !exists {
        return Err(api_not_found("resource not found"));
    }
    Ok(())
}
