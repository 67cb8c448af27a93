use crate::model::{
    Article, ArticlePage, ArticleQuery, PermissionAction, PermissionResource, Role, RoleGrant,
    User, UserSession,
};
use async_trait::async_trait;
use atrium_common::ids::{ActionId, ArticleId, ResourceId, RoleId, SessionId, UserId};
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub max_page_size: u32,
}

impl StoreConfig {
    /// Hard upper bound applied to article pages regardless of what the
    /// caller asked for.
    pub fn page_limit(&self, requested: u32) -> u32 {
        requested.min(self.max_page_size).max(1)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence boundary for the admin service.
///
/// Single-entity lookups return `Ok(None)` for missing records; mutations
/// signal missing targets with `StoreError::NotFound` and uniqueness
/// violations with `StoreError::Conflict`.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: User, password_hash: String) -> StoreResult<User>;
    async fn update_user(&self, user: User, password_hash: Option<String>) -> StoreResult<User>;
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;
    async fn user_exists(&self, id: UserId) -> StoreResult<bool>;
    async fn user_password_hash(&self, id: UserId) -> StoreResult<Option<String>>;
    async fn set_user_roles(&self, id: UserId, roles: Vec<RoleId>) -> StoreResult<()>;
    async fn list_user_roles(&self, id: UserId) -> StoreResult<Vec<Role>>;

    async fn list_roles(&self) -> StoreResult<Vec<Role>>;
    async fn get_role(&self, id: RoleId) -> StoreResult<Option<Role>>;
    async fn create_role(&self, role: Role) -> StoreResult<Role>;
    async fn update_role(&self, role: Role) -> StoreResult<Role>;
    async fn delete_role(&self, id: RoleId) -> StoreResult<()>;

    async fn list_resources(&self) -> StoreResult<Vec<PermissionResource>>;
    async fn get_resource(&self, id: ResourceId) -> StoreResult<Option<PermissionResource>>;
    async fn create_resource(&self, resource: PermissionResource)
    -> StoreResult<PermissionResource>;
    async fn update_resource(&self, resource: PermissionResource)
    -> StoreResult<PermissionResource>;
    async fn delete_resource(&self, id: ResourceId) -> StoreResult<()>;

    async fn list_actions(&self, resource_id: ResourceId) -> StoreResult<Vec<PermissionAction>>;
    async fn get_action(&self, id: ActionId) -> StoreResult<Option<PermissionAction>>;
    async fn create_action(&self, action: PermissionAction) -> StoreResult<PermissionAction>;
    async fn update_action(&self, action: PermissionAction) -> StoreResult<PermissionAction>;
    async fn delete_action(&self, id: ActionId) -> StoreResult<()>;

    /// Record that `role_id` holds `action_id`. Granting an existing pair is
    /// a no-op so the HTTP PUT stays idempotent.
    async fn grant_action(&self, role_id: RoleId, action_id: ActionId) -> StoreResult<()>;
    async fn revoke_action(&self, role_id: RoleId, action_id: ActionId) -> StoreResult<()>;
    /// Joined (resource, action) rows for every grant the role holds.
    async fn role_grants(&self, role_id: RoleId) -> StoreResult<Vec<RoleGrant>>;

    async fn create_session(&self, session: UserSession) -> StoreResult<UserSession>;
    async fn get_session(&self, id: SessionId) -> StoreResult<Option<UserSession>>;
    async fn find_session_by_refresh_token(&self, token: &str)
    -> StoreResult<Option<UserSession>>;
    async fn list_sessions_by_user(&self, user_id: UserId) -> StoreResult<Vec<UserSession>>;
    async fn delete_session(&self, id: SessionId) -> StoreResult<()>;
    /// Remove every session owned by `user_id`, returning how many went away.
    async fn delete_sessions_by_user(&self, user_id: UserId) -> StoreResult<u64>;

    async fn list_articles(&self, query: ArticleQuery) -> StoreResult<ArticlePage>;
    async fn get_article(&self, id: ArticleId) -> StoreResult<Option<Article>>;
    async fn create_article(&self, article: Article) -> StoreResult<Article>;
    async fn update_article(&self, article: Article) -> StoreResult<Article>;
    async fn delete_article(&self, id: ArticleId) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
