//! OpenAPI schema aggregation for the admin API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for
//! docs and client generation.
use crate::api::{
    articles, permissions, roles, sessions, system,
    types::{
        ActionCreateRequest, ActionListResponse, ActionUpdateRequest, ArticleCreateRequest,
        ArticleListResponse, ArticleUpdateRequest, ErrorResponse, FeatureFlags, HealthStatus,
        ResourceCreateRequest, ResourceListResponse, ResourceUpdateRequest, RoleCreateRequest,
        RoleListResponse, RoleUpdateRequest, SessionCreateRequest, SessionListResponse,
        SessionLookupRequest, SessionsDeletedResponse, SystemInfo, UserCreateRequest,
        UserListResponse, UserRolesRequest, UserUpdateRequest,
    },
    users,
};
use crate::model::{
    Article, ArticleSortField, PermissionAction, PermissionResource, ResourceGrant, Role,
    RoleGrant, RolePermissions, SortOrder, User, UserSession,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "atrium-admind",
        version = "v1",
        description = "Atrium admin HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_user_roles,
        users::set_user_roles,
        users::list_user_sessions,
        users::delete_user_sessions,
        roles::list_roles,
        roles::create_role,
        roles::get_role,
        roles::update_role,
        roles::delete_role,
        roles::role_permissions,
        roles::grant_action,
        roles::revoke_action,
        permissions::list_resources,
        permissions::create_resource,
        permissions::get_resource,
        permissions::update_resource,
        permissions::delete_resource,
        permissions::list_actions,
        permissions::create_action,
        permissions::get_action,
        permissions::update_action,
        permissions::delete_action,
        articles::list_articles,
        articles::create_article,
        articles::get_article,
        articles::update_article,
        articles::delete_article,
        sessions::create_session,
        sessions::lookup_session,
        sessions::get_session,
        sessions::delete_session,
    ),
    components(schemas(
        ActionCreateRequest,
        ActionListResponse,
        ActionUpdateRequest,
        Article,
        ArticleCreateRequest,
        ArticleListResponse,
        ArticleSortField,
        ArticleUpdateRequest,
        ErrorResponse,
        FeatureFlags,
        HealthStatus,
        PermissionAction,
        PermissionResource,
        ResourceCreateRequest,
        ResourceGrant,
        ResourceListResponse,
        ResourceUpdateRequest,
        Role,
        RoleCreateRequest,
        RoleGrant,
        RoleListResponse,
        RolePermissions,
        RoleUpdateRequest,
        SessionCreateRequest,
        SessionListResponse,
        SessionLookupRequest,
        SessionsDeletedResponse,
        SortOrder,
        SystemInfo,
        User,
        UserCreateRequest,
        UserListResponse,
        UserRolesRequest,
        UserSession,
        UserUpdateRequest,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_contains_core_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/v1/users"));
        assert!(paths.contains_key("/v1/roles/{role_id}/permissions"));
        assert!(paths.contains_key("/v1/articles"));
        assert!(paths.contains_key("/v1/sessions/lookup"));
    }
}
