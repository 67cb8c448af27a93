//! In-memory implementation of the admin store.
//!
//! # Purpose
//! This store implements the `AdminStore` trait entirely in memory using `HashMap`s guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//! - as a fallback when a durable backend (e.g., Postgres) is not configured
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: operations are consistent within one process. We use write
//!   locks for mutations and read locks for reads.
//! - **No multi-node coordination**: multiple admind instances each have independent state.
//!
//! # Referential integrity
//! Relations (user/role assignments, role/action grants, sessions, article authorship) are kept
//! consistent by the mutation paths themselves:
//! - deleting a user removes that user's sessions and role assignments in the same call
//! - deleting a role removes its grants and assignments
//! - deleting a resource removes its actions and their grants
//! - deleting a user who still authors articles is rejected with a conflict
//!
//! Durable backends implement the same rules with SQL transactions.
//!
//! # Performance characteristics
//! - Reads are cheap and concurrent (many readers).
//! - Writes are serialized per map (write lock per structure).
//! - Lookups by secondary key (email, refresh token) and cascades scan values; this is acceptable
//!   for small in-memory dev workloads but would be inefficient at very large scale.
//!
//! # Metrics
//! This store updates a small set of gauges to keep observability behavior consistent with
//! durable backends.
use super::{AdminStore, StoreConfig, StoreError, StoreResult};
use crate::model::{
    Article, ArticlePage, ArticleQuery, ArticleSortField, PermissionAction, PermissionResource,
    Role, RoleGrant, SortOrder, User, UserSession,
};
use async_trait::async_trait;
use atrium_common::ids::{ActionId, ArticleId, ResourceId, RoleId, SessionId, UserId};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory admin store.
///
/// ## Data structures
/// - Authoritative state is stored in `HashMap`s keyed by typed IDs.
/// - The role/action grant relation is a `HashSet` of id pairs.
///
/// All maps are wrapped in `Arc<RwLock<...>>` so:
/// - the store can be shared across async request handlers
/// - reads can proceed concurrently
/// - writes are serialized to preserve invariants
pub struct MemoryStore {
    /// Store-level configuration (page-size bound).
    config: StoreConfig,
    /// Authoritative user records keyed by user id.
    users: Arc<RwLock<HashMap<UserId, User>>>,
    /// Password hashes, kept apart from the API-facing user record.
    credentials: Arc<RwLock<HashMap<UserId, String>>>,
    /// Role assignments per user.
    user_roles: Arc<RwLock<HashMap<UserId, Vec<RoleId>>>>,
    /// Authoritative role records keyed by role id.
    roles: Arc<RwLock<HashMap<RoleId, Role>>>,
    /// Authoritative permission resources keyed by resource id.
    resources: Arc<RwLock<HashMap<ResourceId, PermissionResource>>>,
    /// Authoritative permission actions keyed by action id.
    actions: Arc<RwLock<HashMap<ActionId, PermissionAction>>>,
    /// The normalized (role, action) grant relation.
    grants: Arc<RwLock<HashSet<(RoleId, ActionId)>>>,
    /// Refresh-token sessions keyed by session id.
    sessions: Arc<RwLock<HashMap<SessionId, UserSession>>>,
    /// Authoritative articles keyed by article id.
    articles: Arc<RwLock<HashMap<ArticleId, Article>>>,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            users: Arc::new(RwLock::new(HashMap::new())),
            credentials: Arc::new(RwLock::new(HashMap::new())),
            user_roles: Arc::new(RwLock::new(HashMap::new())),
            roles: Arc::new(RwLock::new(HashMap::new())),
            resources: Arc::new(RwLock::new(HashMap::new())),
            actions: Arc::new(RwLock::new(HashMap::new())),
            grants: Arc::new(RwLock::new(HashSet::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            articles: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn article_cmp(a: &Article, b: &Article, sort: ArticleSortField, order: SortOrder) -> Ordering {
    let ordering = match sort {
        ArticleSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        ArticleSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    let ordering = match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    // Tie-break by id so pagination stays stable across identical timestamps.
    ordering.then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut items: Vec<User> = self.users.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(items)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create_user(&self, user: User, password_hash: String) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict("user exists".into()));
        }
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict("email exists".into()));
        }
        users.insert(user.id, user.clone());
        self.credentials.write().await.insert(user.id, password_hash);
        metrics::gauge!("atrium_users_total").set(users.len() as f64);
        Ok(user)
    }

    async fn update_user(&self, user: User, password_hash: Option<String>) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound("user".into()));
        }
        if users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(StoreError::Conflict("email exists".into()));
        }
        users.insert(user.id, user.clone());
        drop(users);
        if let Some(hash) = password_hash {
            self.credentials.write().await.insert(user.id, hash);
        }
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        // Authors keep their articles; refuse the delete instead of leaving
        // dangling references behind.
        if self
            .articles
            .read()
            .await
            .values()
            .any(|article| article.author_id == id)
        {
            return Err(StoreError::Conflict("user has articles".into()));
        }
        let mut users = self.users.write().await;
        if users.remove(&id).is_none() {
            return Err(StoreError::NotFound("user".into()));
        }
        metrics::gauge!("atrium_users_total").set(users.len() as f64);
        drop(users);
        self.credentials.write().await.remove(&id);
        self.user_roles.write().await.remove(&id);
        // Session cleanup is an application-level cascade, mirrored by the
        // standalone delete_sessions_by_user operation.
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.user_id != id);
        metrics::gauge!("atrium_sessions_total").set(sessions.len() as f64);
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.users.read().await.contains_key(&id))
    }

    async fn user_password_hash(&self, id: UserId) -> StoreResult<Option<String>> {
        Ok(self.credentials.read().await.get(&id).cloned())
    }

    async fn set_user_roles(&self, id: UserId, roles: Vec<RoleId>) -> StoreResult<()> {
        if !self.users.read().await.contains_key(&id) {
            return Err(StoreError::NotFound("user".into()));
        }
        let known = self.roles.read().await;
        for role_id in &roles {
            if !known.contains_key(role_id) {
                return Err(StoreError::NotFound("role".into()));
            }
        }
        drop(known);
        // Replace the full assignment set; duplicates collapse to one entry.
        let mut deduped = Vec::with_capacity(roles.len());
        for role_id in roles {
            if !deduped.contains(&role_id) {
                deduped.push(role_id);
            }
        }
        self.user_roles.write().await.insert(id, deduped);
        Ok(())
    }

    async fn list_user_roles(&self, id: UserId) -> StoreResult<Vec<Role>> {
        let assigned = self
            .user_roles
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default();
        let roles = self.roles.read().await;
        let mut items: Vec<Role> = assigned
            .iter()
            .filter_map(|role_id| roles.get(role_id).cloned())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let mut items: Vec<Role> = self.roles.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        Ok(self.roles.read().await.get(&id).cloned())
    }

    async fn create_role(&self, role: Role) -> StoreResult<Role> {
        let mut roles = self.roles.write().await;
        if roles.contains_key(&role.id) {
            return Err(StoreError::Conflict("role exists".into()));
        }
        if roles.values().any(|existing| existing.name == role.name) {
            return Err(StoreError::Conflict("role name exists".into()));
        }
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, role: Role) -> StoreResult<Role> {
        let mut roles = self.roles.write().await;
        if !roles.contains_key(&role.id) {
            return Err(StoreError::NotFound("role".into()));
        }
        if roles
            .values()
            .any(|existing| existing.id != role.id && existing.name == role.name)
        {
            return Err(StoreError::Conflict("role name exists".into()));
        }
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<()> {
        let mut roles = self.roles.write().await;
        if roles.remove(&id).is_none() {
            return Err(StoreError::NotFound("role".into()));
        }
        drop(roles);
        self.grants
            .write()
            .await
            .retain(|(role_id, _)| *role_id != id);
        let mut user_roles = self.user_roles.write().await;
        for assigned in user_roles.values_mut() {
            assigned.retain(|role_id| *role_id != id);
        }
        Ok(())
    }

    async fn list_resources(&self) -> StoreResult<Vec<PermissionResource>> {
        let mut items: Vec<PermissionResource> =
            self.resources.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_resource(&self, id: ResourceId) -> StoreResult<Option<PermissionResource>> {
        Ok(self.resources.read().await.get(&id).cloned())
    }

    async fn create_resource(
        &self,
        resource: PermissionResource,
    ) -> StoreResult<PermissionResource> {
        let mut resources = self.resources.write().await;
        if resources.contains_key(&resource.id) {
            return Err(StoreError::Conflict("resource exists".into()));
        }
        if resources
            .values()
            .any(|existing| existing.name == resource.name)
        {
            return Err(StoreError::Conflict("resource name exists".into()));
        }
        resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    async fn update_resource(
        &self,
        resource: PermissionResource,
    ) -> StoreResult<PermissionResource> {
        let mut resources = self.resources.write().await;
        if !resources.contains_key(&resource.id) {
            return Err(StoreError::NotFound("resource".into()));
        }
        if resources
            .values()
            .any(|existing| existing.id != resource.id && existing.name == resource.name)
        {
            return Err(StoreError::Conflict("resource name exists".into()));
        }
        resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    async fn delete_resource(&self, id: ResourceId) -> StoreResult<()> {
        let mut resources = self.resources.write().await;
        if resources.remove(&id).is_none() {
            return Err(StoreError::NotFound("resource".into()));
        }
        drop(resources);
        // Cascading delete: a resource takes its actions and their grants
        // with it.
        let mut actions = self.actions.write().await;
        let removed: Vec<ActionId> = actions
            .iter()
            .filter(|(_, action)| action.resource_id == id)
            .map(|(action_id, _)| *action_id)
            .collect();
        for action_id in &removed {
            actions.remove(action_id);
        }
        drop(actions);
        self.grants
            .write()
            .await
            .retain(|(_, action_id)| !removed.contains(action_id));
        Ok(())
    }

    async fn list_actions(&self, resource_id: ResourceId) -> StoreResult<Vec<PermissionAction>> {
        let mut items: Vec<PermissionAction> = self
            .actions
            .read()
            .await
            .values()
            .filter(|action| action.resource_id == resource_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_action(&self, id: ActionId) -> StoreResult<Option<PermissionAction>> {
        Ok(self.actions.read().await.get(&id).cloned())
    }

    async fn create_action(&self, action: PermissionAction) -> StoreResult<PermissionAction> {
        // Actions are scoped to a resource; reject creation if the parent
        // resource doesn't exist.
        if !self
            .resources
            .read()
            .await
            .contains_key(&action.resource_id)
        {
            return Err(StoreError::NotFound("resource".into()));
        }
        let mut actions = self.actions.write().await;
        if actions.contains_key(&action.id) {
            return Err(StoreError::Conflict("action exists".into()));
        }
        if actions.values().any(|existing| {
            existing.resource_id == action.resource_id && existing.name == action.name
        }) {
            return Err(StoreError::Conflict("action name exists".into()));
        }
        actions.insert(action.id, action.clone());
        Ok(action)
    }

    async fn update_action(&self, action: PermissionAction) -> StoreResult<PermissionAction> {
        if !self
            .resources
            .read()
            .await
            .contains_key(&action.resource_id)
        {
            return Err(StoreError::NotFound("resource".into()));
        }
        let mut actions = self.actions.write().await;
        if !actions.contains_key(&action.id) {
            return Err(StoreError::NotFound("action".into()));
        }
        if actions.values().any(|existing| {
            existing.id != action.id
                && existing.resource_id == action.resource_id
                && existing.name == action.name
        }) {
            return Err(StoreError::Conflict("action name exists".into()));
        }
        actions.insert(action.id, action.clone());
        Ok(action)
    }

    async fn delete_action(&self, id: ActionId) -> StoreResult<()> {
        let mut actions = self.actions.write().await;
        if actions.remove(&id).is_none() {
            return Err(StoreError::NotFound("action".into()));
        }
        drop(actions);
        self.grants
            .write()
            .await
            .retain(|(_, action_id)| *action_id != id);
        Ok(())
    }

    async fn grant_action(&self, role_id: RoleId, action_id: ActionId) -> StoreResult<()> {
        if !self.roles.read().await.contains_key(&role_id) {
            return Err(StoreError::NotFound("role".into()));
        }
        if !self.actions.read().await.contains_key(&action_id) {
            return Err(StoreError::NotFound("action".into()));
        }
        // Insert into a set: granting twice leaves a single record, which is
        // what keeps the assembled view free of duplicate entries.
        self.grants.write().await.insert((role_id, action_id));
        Ok(())
    }

    async fn revoke_action(&self, role_id: RoleId, action_id: ActionId) -> StoreResult<()> {
        if !self.grants.write().await.remove(&(role_id, action_id)) {
            return Err(StoreError::NotFound("grant".into()));
        }
        Ok(())
    }

    async fn role_grants(&self, role_id: RoleId) -> StoreResult<Vec<RoleGrant>> {
        let grants = self.grants.read().await;
        let actions = self.actions.read().await;
        let resources = self.resources.read().await;
        let mut rows = Vec::new();
        for (granted_role, action_id) in grants.iter() {
            if *granted_role != role_id {
                continue;
            }
            let Some(action) = actions.get(action_id) else {
                continue;
            };
            let Some(resource) = resources.get(&action.resource_id) else {
                continue;
            };
            rows.push(RoleGrant {
                resource: resource.clone(),
                action: action.clone(),
            });
        }
        Ok(rows)
    }

    async fn create_session(&self, session: UserSession) -> StoreResult<UserSession> {
        if !self.users.read().await.contains_key(&session.user_id) {
            return Err(StoreError::NotFound("user".into()));
        }
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict("session exists".into()));
        }
        if sessions
            .values()
            .any(|existing| existing.refresh_token == session.refresh_token)
        {
            return Err(StoreError::Conflict("refresh token exists".into()));
        }
        sessions.insert(session.id, session.clone());
        metrics::gauge!("atrium_sessions_total").set(sessions.len() as f64);
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> StoreResult<Option<UserSession>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_session_by_refresh_token(
        &self,
        token: &str,
    ) -> StoreResult<Option<UserSession>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|session| session.refresh_token == token)
            .cloned())
    }

    async fn list_sessions_by_user(&self, user_id: UserId) -> StoreResult<Vec<UserSession>> {
        let mut items: Vec<UserSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|session| session.created_at);
        Ok(items)
    }

    async fn delete_session(&self, id: SessionId) -> StoreResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(&id).is_none() {
            return Err(StoreError::NotFound("session".into()));
        }
        metrics::gauge!("atrium_sessions_total").set(sessions.len() as f64);
        Ok(())
    }

    async fn delete_sessions_by_user(&self, user_id: UserId) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        metrics::gauge!("atrium_sessions_total").set(sessions.len() as f64);
        Ok((before - sessions.len()) as u64)
    }

    async fn list_articles(&self, query: ArticleQuery) -> StoreResult<ArticlePage> {
        let guard = self.articles.read().await;
        let mut items: Vec<Article> = guard
            .values()
            .filter(|article| {
                if let Some(author_id) = query.author_id
                    && article.author_id != author_id
                {
                    return false;
                }
                if let Some(title) = &query.title
                    && !article
                        .title
                        .to_lowercase()
                        .contains(&title.to_lowercase())
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();
        drop(guard);
        items.sort_by(|a, b| article_cmp(a, b, query.sort, query.order));
        let total = items.len() as u64;
        let page_size = self.config.page_limit(query.page_size) as usize;
        let offset = (query.page.max(1) as usize - 1).saturating_mul(page_size);
        let items = items.into_iter().skip(offset).take(page_size).collect();
        Ok(ArticlePage { items, total })
    }

    async fn get_article(&self, id: ArticleId) -> StoreResult<Option<Article>> {
        Ok(self.articles.read().await.get(&id).cloned())
    }

    async fn create_article(&self, article: Article) -> StoreResult<Article> {
        // Articles are scoped to an author; reject creation if the author
        // doesn't exist.
        if !self.users.read().await.contains_key(&article.author_id) {
            return Err(StoreError::NotFound("user".into()));
        }
        let mut articles = self.articles.write().await;
        if articles.contains_key(&article.id) {
            return Err(StoreError::Conflict("article exists".into()));
        }
        articles.insert(article.id, article.clone());
        metrics::gauge!("atrium_articles_total").set(articles.len() as f64);
        Ok(article)
    }

    async fn update_article(&self, article: Article) -> StoreResult<Article> {
        if !self.users.read().await.contains_key(&article.author_id) {
            return Err(StoreError::NotFound("user".into()));
        }
        let mut articles = self.articles.write().await;
        if !articles.contains_key(&article.id) {
            return Err(StoreError::NotFound("article".into()));
        }
        articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn delete_article(&self, id: ArticleId) -> StoreResult<()> {
        let mut articles = self.articles.write().await;
        if articles.remove(&id).is_none() {
            return Err(StoreError::NotFound("article".into()));
        }
        metrics::gauge!("atrium_articles_total").set(articles.len() as f64);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        // In-memory backend is always "healthy" if the process is running.
        // Durable backends probe connectivity instead.
        Ok(())
    }

    /// Whether this backend provides persistence across restarts.
    fn is_durable(&self) -> bool {
        false
    }

    /// Human-readable backend identifier used in logs/diagnostics.
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn store() -> MemoryStore {
        MemoryStore::new(StoreConfig { max_page_size: 100 })
    }

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: email.to_string(),
            display_name: email.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn article(author: UserId, title: &str, offset_secs: i64) -> Article {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Article {
            id: ArticleId::new(),
            title: title.to_string(),
            body: "body".to_string(),
            author_id: author,
            created_at: at,
            updated_at: at,
        }
    }

    fn session(user_id: UserId, token: &str) -> UserSession {
        let now = Utc::now();
        UserSession {
            id: SessionId::new(),
            user_id,
            refresh_token: token.to_string(),
            created_at: now,
            expires_at: now + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn user_email_conflict_and_lookup() {
        let store = store();
        let created = store
            .create_user(user("a@example.com"), "hash-a".into())
            .await
            .expect("user");

        let err = store
            .create_user(user("a@example.com"), "hash-b".into())
            .await
            .expect_err("email conflict");
        assert!(matches!(err, StoreError::Conflict(_)));

        let found = store
            .find_user_by_email("a@example.com")
            .await
            .expect("lookup");
        assert_eq!(found.expect("present").id, created.id);
        assert!(
            store
                .find_user_by_email("missing@example.com")
                .await
                .expect("lookup")
                .is_none()
        );
        assert_eq!(
            store
                .user_password_hash(created.id)
                .await
                .expect("hash")
                .as_deref(),
            Some("hash-a")
        );
    }

    #[tokio::test]
    async fn set_user_roles_replaces_and_validates() {
        let store = store();
        let user = store
            .create_user(user("roles@example.com"), "hash".into())
            .await
            .expect("user");
        let editor = store
            .create_role(Role {
                id: RoleId::new(),
                name: "editor".into(),
            })
            .await
            .expect("role");
        let admin = store
            .create_role(Role {
                id: RoleId::new(),
                name: "admin".into(),
            })
            .await
            .expect("role");

        let err = store
            .set_user_roles(user.id, vec![RoleId::new()])
            .await
            .expect_err("unknown role");
        assert!(matches!(err, StoreError::NotFound(_)));

        store
            .set_user_roles(user.id, vec![editor.id, admin.id, editor.id])
            .await
            .expect("assign");
        let assigned = store.list_user_roles(user.id).await.expect("list");
        assert_eq!(assigned.len(), 2);

        store
            .set_user_roles(user.id, vec![admin.id])
            .await
            .expect("replace");
        let assigned = store.list_user_roles(user.id).await.expect("list");
        assert_eq!(assigned, vec![admin]);
    }

    #[tokio::test]
    async fn grants_join_resources_and_cascade_on_resource_delete() {
        let store = store();
        let role = store
            .create_role(Role {
                id: RoleId::new(),
                name: "editor".into(),
            })
            .await
            .expect("role");
        let articles = store
            .create_resource(PermissionResource {
                id: ResourceId::new(),
                name: "articles".into(),
            })
            .await
            .expect("resource");
        let create = store
            .create_action(PermissionAction {
                id: ActionId::new(),
                resource_id: articles.id,
                name: "create".into(),
            })
            .await
            .expect("action");

        store.grant_action(role.id, create.id).await.expect("grant");
        // Granting the same pair again is a no-op, not a conflict.
        store.grant_action(role.id, create.id).await.expect("grant");

        let rows = store.role_grants(role.id).await.expect("grants");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resource.id, articles.id);
        assert_eq!(rows[0].action.id, create.id);

        store.delete_resource(articles.id).await.expect("delete");
        assert!(store.get_action(create.id).await.expect("get").is_none());
        assert!(store.role_grants(role.id).await.expect("grants").is_empty());

        let err = store
            .revoke_action(role.id, create.id)
            .await
            .expect_err("grant gone");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn sessions_unique_token_and_user_cascade() {
        let store = store();
        let owner = store
            .create_user(user("owner@example.com"), "hash".into())
            .await
            .expect("user");

        store
            .create_session(session(owner.id, "token-1"))
            .await
            .expect("session");
        store
            .create_session(session(owner.id, "token-2"))
            .await
            .expect("session");
        let err = store
            .create_session(session(owner.id, "token-1"))
            .await
            .expect_err("token conflict");
        assert!(matches!(err, StoreError::Conflict(_)));

        let found = store
            .find_session_by_refresh_token("token-2")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.user_id, owner.id);
        assert!(
            store
                .find_session_by_refresh_token("token-9")
                .await
                .expect("lookup")
                .is_none()
        );

        let removed = store
            .delete_sessions_by_user(owner.id)
            .await
            .expect("bulk delete");
        assert_eq!(removed, 2);
        assert!(
            store
                .list_sessions_by_user(owner.id)
                .await
                .expect("list")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_user_cascades_sessions_but_not_articles() {
        let store = store();
        let author = store
            .create_user(user("author@example.com"), "hash".into())
            .await
            .expect("user");
        store
            .create_session(session(author.id, "token"))
            .await
            .expect("session");
        store
            .create_article(article(author.id, "kept", 0))
            .await
            .expect("article");

        let err = store.delete_user(author.id).await.expect_err("has articles");
        assert!(matches!(err, StoreError::Conflict(_)));

        let page = store
            .list_articles(ArticleQuery {
                page: 1,
                page_size: 10,
                title: None,
                author_id: Some(author.id),
                sort: ArticleSortField::CreatedAt,
                order: SortOrder::Desc,
            })
            .await
            .expect("articles");
        store
            .delete_article(page.items[0].id)
            .await
            .expect("delete article");

        store.delete_user(author.id).await.expect("delete user");
        assert!(
            store
                .list_sessions_by_user(author.id)
                .await
                .expect("sessions")
                .is_empty()
        );
        assert!(store.get_user(author.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn article_pages_filter_sort_and_report_totals() {
        let store = store();
        let alice = store
            .create_user(user("alice@example.com"), "hash".into())
            .await
            .expect("user");
        let bob = store
            .create_user(user("bob@example.com"), "hash".into())
            .await
            .expect("user");
        for i in 0..7 {
            store
                .create_article(article(alice.id, &format!("Release notes {i}"), i))
                .await
                .expect("article");
        }
        store
            .create_article(article(bob.id, "Unrelated memo", 100))
            .await
            .expect("article");

        let page = store
            .list_articles(ArticleQuery {
                page: 1,
                page_size: 5,
                title: Some("release".into()),
                author_id: Some(alice.id),
                sort: ArticleSortField::CreatedAt,
                order: SortOrder::Asc,
            })
            .await
            .expect("page");
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].title, "Release notes 0");

        let page = store
            .list_articles(ArticleQuery {
                page: 2,
                page_size: 5,
                title: Some("release".into()),
                author_id: Some(alice.id),
                sort: ArticleSortField::CreatedAt,
                order: SortOrder::Asc,
            })
            .await
            .expect("page");
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].title, "Release notes 6");

        let newest_first = store
            .list_articles(ArticleQuery {
                page: 1,
                page_size: 10,
                title: None,
                author_id: None,
                sort: ArticleSortField::UpdatedAt,
                order: SortOrder::Desc,
            })
            .await
            .expect("page");
        assert_eq!(newest_first.total, 8);
        assert_eq!(newest_first.items[0].title, "Unrelated memo");
    }

    #[tokio::test]
    async fn backend_health_and_identity() {
        let store = store();
        store.health_check().await.expect("health");
        assert!(!store.is_durable());
        assert_eq!(store.backend_name(), "memory");
    }
}
