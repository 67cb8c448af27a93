//! HTTP API request/response types.
//!
//! # Purpose
//! Defines shared payload shapes for the admin REST API and OpenAPI schema
//! generation.
use crate::model::{
    Article, ArticleSortField, PermissionAction, PermissionResource, Role, SortOrder, User,
    UserSession,
};
use atrium_common::ids::{ResourceId, RoleId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct FeatureFlags {
    pub durable_storage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub api_version: String,
    pub backend: String,
    pub features: FeatureFlags,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserCreateRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserUpdateRequest {
    pub email: String,
    pub display_name: String,
    /// Present to rotate the stored credentials; absent keeps them.
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserListResponse {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserRolesRequest {
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct RoleCreateRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct RoleUpdateRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct RoleListResponse {
    pub items: Vec<Role>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ResourceCreateRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ResourceUpdateRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ResourceListResponse {
    pub items: Vec<PermissionResource>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ActionCreateRequest {
    pub name: String,
}

/// Full-record action update; `resource_id` may move the action to another
/// resource.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ActionUpdateRequest {
    pub resource_id: ResourceId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ActionListResponse {
    pub items: Vec<PermissionAction>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ArticleCreateRequest {
    pub title: String,
    pub body: String,
    pub author_id: UserId,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ArticleUpdateRequest {
    pub title: String,
    pub body: String,
    pub author_id: UserId,
}

/// Query string accepted by the article list endpoint.
#[derive(Debug, Deserialize, IntoParams, Clone, Default)]
#[into_params(parameter_in = Query)]
pub struct ArticleListParams {
    /// 1-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Items per page; defaults to 20.
    pub page_size: Option<u32>,
    /// Case-insensitive title substring filter.
    pub title: Option<String>,
    /// Restrict to one author.
    pub author_id: Option<UserId>,
    /// Sort field; defaults to `created_at`.
    pub sort: Option<ArticleSortField>,
    /// Sort direction; defaults to `desc`.
    pub order: Option<SortOrder>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ArticleListResponse {
    pub items: Vec<Article>,
    /// Total records matching the filter, independent of pagination.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Session creation verifies the user's stored credentials and issues a
/// fresh refresh token.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SessionCreateRequest {
    pub email: String,
    pub password: String,
}

/// Refresh tokens travel in the body, never in the URL.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SessionLookupRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SessionListResponse {
    pub items: Vec<UserSession>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SessionsDeletedResponse {
    pub deleted: u64,
}
