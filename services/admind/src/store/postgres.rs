//! Postgres-backed implementation of the admin store.
//!
//! # What this module is
//! This module implements the `AdminStore` trait using Postgres (via `sqlx`) as a durable, shared
//! backing store for the admin domain: users and their credentials, roles and assignments, the
//! normalized permission matrix, refresh-token sessions, and articles.
//!
//! # Key invariants
//! - Authoritative tables represent current state; there is no soft delete.
//! - Uniqueness (email, role/resource names, per-resource action names, refresh tokens) is
//!   enforced by SQL constraints and surfaced to callers as `StoreError::Conflict`.
//! - Cascading cleanup (sessions and assignments on user delete, grants on role/resource/action
//!   delete) runs as explicit deletes inside one transaction rather than `ON DELETE CASCADE`,
//!   keeping the cascade an application-level responsibility shared with the in-memory backend.
//!
//! # Security model / threat assumptions
//! - Database URLs may contain credentials; avoid logging them.
//! - Password hashes are write-mostly columns read only by the credential check path.
//! - Dynamic SQL fragments are limited to sort columns/directions mapped from closed enums.
//!
//! # Concurrency model
//! - The store is shared across async handlers; `sqlx::PgPool` manages concurrency.
//! - Each method acquires a pooled connection; pool sizing controls throughput.
//!
//! # Consistency / atomicity
//! Multi-statement mutations (`delete_user`, `set_user_roles`, `delete_role`, `delete_resource`,
//! `delete_action`) are implemented as transactions so dependents and the primary row change
//! atomically. Single-row mutations rely on constraint errors mapped to typed store errors.
//!
//! # Operational notes
//! - Migrations are executed at startup via `sqlx::migrate!("./migrations")` so handlers can
//!   assume the schema exists. If migrations fail, startup fails rather than serving partially
//!   functional endpoints.
//! - Connection pooling/timeouts are explicitly configured because hanging forever on DB failures
//!   is unacceptable for a control-path service.
//!
//! # How to use
//! Call [`PostgresStore::connect`] with a [`PostgresConfig`] and [`StoreConfig`], then use the
//! returned store via the [`AdminStore`] trait.
use super::{AdminStore, StoreConfig, StoreError, StoreResult};
use crate::config::PostgresConfig;
use crate::model::{
    Article, ArticlePage, ArticleQuery, ArticleSortField, PermissionAction, PermissionResource,
    Role, RoleGrant, SortOrder, User, UserSession,
};
use async_trait::async_trait;
use atrium_common::ids::{ActionId, ArticleId, ResourceId, RoleId, SessionId, UserId};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Durable admin store backed by Postgres.
pub struct PostgresStore {
    pool: PgPool,
    config: StoreConfig,
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        StoreError::Unexpected(value.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(value.into())
    }
}

/// Row shape for the `users` table.
///
/// DB-facing structs are kept separate from domain types to isolate schema
/// details (column names, storage formats) from the API domain model and to
/// make it explicit where parsing/validation occurs.
#[derive(Debug, Clone, FromRow)]
struct DbUser {
    id: Uuid,
    email: String,
    display_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row shape for the `roles` table.
#[derive(Debug, Clone, FromRow)]
struct DbRole {
    id: Uuid,
    name: String,
}

impl From<DbRole> for Role {
    fn from(row: DbRole) -> Self {
        Role {
            id: RoleId::from_uuid(row.id),
            name: row.name,
        }
    }
}

/// Row shape for the `permission_resources` table.
#[derive(Debug, Clone, FromRow)]
struct DbResource {
    id: Uuid,
    name: String,
}

impl From<DbResource> for PermissionResource {
    fn from(row: DbResource) -> Self {
        PermissionResource {
            id: ResourceId::from_uuid(row.id),
            name: row.name,
        }
    }
}

/// Row shape for the `permission_actions` table.
#[derive(Debug, Clone, FromRow)]
struct DbAction {
    id: Uuid,
    resource_id: Uuid,
    name: String,
}

impl From<DbAction> for PermissionAction {
    fn from(row: DbAction) -> Self {
        PermissionAction {
            id: ActionId::from_uuid(row.id),
            resource_id: ResourceId::from_uuid(row.resource_id),
            name: row.name,
        }
    }
}

/// Row shape for the grant join across `role_grants`, `permission_actions`,
/// and `permission_resources`.
#[derive(Debug, Clone, FromRow)]
struct DbRoleGrant {
    action_id: Uuid,
    action_name: String,
    resource_id: Uuid,
    resource_name: String,
}

impl From<DbRoleGrant> for RoleGrant {
    fn from(row: DbRoleGrant) -> Self {
        RoleGrant {
            resource: PermissionResource {
                id: ResourceId::from_uuid(row.resource_id),
                name: row.resource_name,
            },
            action: PermissionAction {
                id: ActionId::from_uuid(row.action_id),
                resource_id: ResourceId::from_uuid(row.resource_id),
                name: row.action_name,
            },
        }
    }
}

/// Row shape for the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
struct DbSession {
    id: Uuid,
    user_id: Uuid,
    refresh_token: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<DbSession> for UserSession {
    fn from(row: DbSession) -> Self {
        UserSession {
            id: SessionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Row shape for the `articles` table.
#[derive(Debug, Clone, FromRow)]
struct DbArticle {
    id: Uuid,
    title: String,
    body: String,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DbArticle> for Article {
    fn from(row: DbArticle) -> Self {
        Article {
            id: ArticleId::from_uuid(row.id),
            title: row.title,
            body: row.body,
            author_id: UserId::from_uuid(row.author_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23503").unwrap_or(false);
    }
    false
}

/// Escape `%`, `_`, and `\` so a title filter matches literally inside ILIKE.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_article_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ArticleQuery) {
    let mut prefix = " WHERE ";
    if let Some(author_id) = query.author_id {
        builder.push(prefix);
        builder.push("author_id = ");
        builder.push_bind(author_id.as_uuid());
        prefix = " AND ";
    }
    if let Some(title) = &query.title {
        builder.push(prefix);
        builder.push("title ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(title)));
    }
}

impl PostgresStore {
    /// Connect to Postgres and run embedded migrations.
    ///
    /// Migrations run before serving requests so handlers can assume the
    /// schema exists; a migration failure fails startup.
    pub async fn connect(pg: &PostgresConfig, config: StoreConfig) -> StoreResult<Self> {
        Self::connect_internal(pg, config, true).await
    }

    /// Connect without running migrations. Intended for tests that manage
    /// the schema externally.
    #[cfg(any(test, feature = "pg-tests"))]
    pub async fn connect_without_migrations(
        pg: &PostgresConfig,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        Self::connect_internal(pg, config, false).await
    }

    async fn connect_internal(
        pg: &PostgresConfig,
        config: StoreConfig,
        run_migrations: bool,
    ) -> StoreResult<Self> {
        // Pool tuning matters for control-path stability:
        // - `max_connections` caps concurrent DB work and protects the DB.
        // - `acquire_timeout` bounds how long a request waits for a pooled
        //   connection before failing fast.
        // Avoid logging `pg.url` because it may contain credentials.
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options)
            .await?;

        if run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
        }

        Ok(Self { pool, config })
    }
}

#[async_trait]
impl AdminStore for PostgresStore {
    // -----------------------------
    // Users
    // -----------------------------

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, DbUser>(
            "SELECT id, email, display_name, created_at, updated_at FROM users ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, DbUser>(
            "SELECT id, email, display_name, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, DbUser>(
            "SELECT id, email, display_name, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: User, password_hash: String) -> StoreResult<User> {
        let insert = sqlx::query(
            r#"INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;
        if let Err(err) = insert {
            if is_unique_violation(&err) {
                return Err(StoreError::Conflict("email exists".into()));
            }
            return Err(err.into());
        }
        Ok(user)
    }

    async fn update_user(&self, user: User, password_hash: Option<String>) -> StoreResult<User> {
        // COALESCE keeps the stored hash when no credential rotation was
        // requested; everything else is a full-record replacement.
        let result = sqlx::query(
            r#"UPDATE users
               SET email = $2, display_name = $3, updated_at = $4,
                   password_hash = COALESCE($5, password_hash)
               WHERE id = $1"#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.updated_at)
        .bind(password_hash)
        .execute(&self.pool)
        .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound("user".into())),
            Ok(_) => Ok(user),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::Conflict("email exists".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let user_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_one(&mut *tx)
                .await?
                > 0;
        if !user_exists {
            return Err(StoreError::NotFound("user".into()));
        }

        let authored =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE author_id = $1")
                .bind(id.as_uuid())
                .fetch_one(&mut *tx)
                .await?;
        if authored > 0 {
            return Err(StoreError::Conflict("user has articles".into()));
        }

        // Application-level cascade: sessions and role assignments go with
        // the user, in the same commit.
        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> StoreResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn user_password_hash(&self, id: UserId) -> StoreResult<Option<String>> {
        let hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        Ok(hash)
    }

    async fn set_user_roles(&self, id: UserId, roles: Vec<RoleId>) -> StoreResult<()> {
        let mut deduped: Vec<Uuid> = Vec::with_capacity(roles.len());
        for role in roles {
            let uuid = role.as_uuid();
            if !deduped.contains(&uuid) {
                deduped.push(uuid);
            }
        }

        let mut tx = self.pool.begin().await?;
        let user_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_one(&mut *tx)
                .await?
                > 0;
        if !user_exists {
            return Err(StoreError::NotFound("user".into()));
        }
        let known = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles WHERE id = ANY($1)")
            .bind(&deduped)
            .fetch_one(&mut *tx)
            .await?;
        if known != deduped.len() as i64 {
            return Err(StoreError::NotFound("role".into()));
        }

        // Replace semantics: clear the assignment set and reinsert.
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        for role_id in &deduped {
            sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                .bind(id.as_uuid())
                .bind(role_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_user_roles(&self, id: UserId) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, DbRole>(
            r#"SELECT r.id, r.name FROM roles r
               JOIN user_roles ur ON ur.role_id = r.id
               WHERE ur.user_id = $1 ORDER BY r.name"#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    // -----------------------------
    // Roles
    // -----------------------------

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, DbRole>("SELECT id, name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn get_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, DbRole>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Role::from))
    }

    async fn create_role(&self, role: Role) -> StoreResult<Role> {
        let insert = sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2)")
            .bind(role.id.as_uuid())
            .bind(&role.name)
            .execute(&self.pool)
            .await;
        if let Err(err) = insert {
            if is_unique_violation(&err) {
                return Err(StoreError::Conflict("role name exists".into()));
            }
            return Err(err.into());
        }
        Ok(role)
    }

    async fn update_role(&self, role: Role) -> StoreResult<Role> {
        let result = sqlx::query("UPDATE roles SET name = $2 WHERE id = $1")
            .bind(role.id.as_uuid())
            .bind(&role.name)
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound("role".into())),
            Ok(_) => Ok(role),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::Conflict("role name exists".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let role_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_one(&mut *tx)
            .await?
            > 0;
        if !role_exists {
            return Err(StoreError::NotFound("role".into()));
        }
        sqlx::query("DELETE FROM role_grants WHERE role_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_roles WHERE role_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // -----------------------------
    // Permission resources
    // -----------------------------

    async fn list_resources(&self) -> StoreResult<Vec<PermissionResource>> {
        let rows = sqlx::query_as::<_, DbResource>(
            "SELECT id, name FROM permission_resources ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PermissionResource::from).collect())
    }

    async fn get_resource(&self, id: ResourceId) -> StoreResult<Option<PermissionResource>> {
        let row = sqlx::query_as::<_, DbResource>(
            "SELECT id, name FROM permission_resources WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PermissionResource::from))
    }

    async fn create_resource(
        &self,
        resource: PermissionResource,
    ) -> StoreResult<PermissionResource> {
        let insert = sqlx::query("INSERT INTO permission_resources (id, name) VALUES ($1, $2)")
            .bind(resource.id.as_uuid())
            .bind(&resource.name)
            .execute(&self.pool)
            .await;
        if let Err(err) = insert {
            if is_unique_violation(&err) {
                return Err(StoreError::Conflict("resource name exists".into()));
            }
            return Err(err.into());
        }
        Ok(resource)
    }

    async fn update_resource(
        &self,
        resource: PermissionResource,
    ) -> StoreResult<PermissionResource> {
        let result = sqlx::query("UPDATE permission_resources SET name = $2 WHERE id = $1")
            .bind(resource.id.as_uuid())
            .bind(&resource.name)
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound("resource".into())),
            Ok(_) => Ok(resource),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::Conflict("resource name exists".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_resource(&self, id: ResourceId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let resource_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM permission_resources WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await?
            > 0;
        if !resource_exists {
            return Err(StoreError::NotFound("resource".into()));
        }
        // Grants reference actions, so they go first, then the actions, then
        // the resource itself.
        sqlx::query(
            r#"DELETE FROM role_grants WHERE action_id IN
               (SELECT id FROM permission_actions WHERE resource_id = $1)"#,
        )
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM permission_actions WHERE resource_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM permission_resources WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // -----------------------------
    // Permission actions
    // -----------------------------

    async fn list_actions(&self, resource_id: ResourceId) -> StoreResult<Vec<PermissionAction>> {
        let rows = sqlx::query_as::<_, DbAction>(
            "SELECT id, resource_id, name FROM permission_actions WHERE resource_id = $1 ORDER BY name",
        )
        .bind(resource_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PermissionAction::from).collect())
    }

    async fn get_action(&self, id: ActionId) -> StoreResult<Option<PermissionAction>> {
        let row = sqlx::query_as::<_, DbAction>(
            "SELECT id, resource_id, name FROM permission_actions WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PermissionAction::from))
    }

    async fn create_action(&self, action: PermissionAction) -> StoreResult<PermissionAction> {
        let insert = sqlx::query(
            "INSERT INTO permission_actions (id, resource_id, name) VALUES ($1, $2, $3)",
        )
        .bind(action.id.as_uuid())
        .bind(action.resource_id.as_uuid())
        .bind(&action.name)
        .execute(&self.pool)
        .await;
        if let Err(err) = insert {
            if is_unique_violation(&err) {
                return Err(StoreError::Conflict("action name exists".into()));
            }
            if is_foreign_key_violation(&err) {
                return Err(StoreError::NotFound("resource".into()));
            }
            return Err(err.into());
        }
        Ok(action)
    }

    async fn update_action(&self, action: PermissionAction) -> StoreResult<PermissionAction> {
        let result =
            sqlx::query("UPDATE permission_actions SET resource_id = $2, name = $3 WHERE id = $1")
                .bind(action.id.as_uuid())
                .bind(action.resource_id.as_uuid())
                .bind(&action.name)
                .execute(&self.pool)
                .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound("action".into())),
            Ok(_) => Ok(action),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::Conflict("action name exists".into()))
            }
            Err(err) if is_foreign_key_violation(&err) => {
                Err(StoreError::NotFound("resource".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_action(&self, id: ActionId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let action_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM permission_actions WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await?
            > 0;
        if !action_exists {
            return Err(StoreError::NotFound("action".into()));
        }
        sqlx::query("DELETE FROM role_grants WHERE action_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM permission_actions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // -----------------------------
    // Grants
    // -----------------------------

    async fn grant_action(&self, role_id: RoleId, action_id: ActionId) -> StoreResult<()> {
        // ON CONFLICT DO NOTHING keeps the grant idempotent; a duplicate PUT
        // must not fail.
        let insert = sqlx::query(
            r#"INSERT INTO role_grants (role_id, action_id) VALUES ($1, $2)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(role_id.as_uuid())
        .bind(action_id.as_uuid())
        .execute(&self.pool)
        .await;
        if let Err(err) = insert {
            if is_foreign_key_violation(&err) {
                // The violated constraint tells us which parent is missing.
                let missing = if let sqlx::Error::Database(db_err) = &err {
                    if db_err
                        .constraint()
                        .map(|name| name.contains("role"))
                        .unwrap_or(false)
                    {
                        "role"
                    } else {
                        "action"
                    }
                } else {
                    "grant"
                };
                return Err(StoreError::NotFound(missing.into()));
            }
            return Err(err.into());
        }
        Ok(())
    }

    async fn revoke_action(&self, role_id: RoleId, action_id: ActionId) -> StoreResult<()> {
        let done = sqlx::query("DELETE FROM role_grants WHERE role_id = $1 AND action_id = $2")
            .bind(role_id.as_uuid())
            .bind(action_id.as_uuid())
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("grant".into()));
        }
        Ok(())
    }

    async fn role_grants(&self, role_id: RoleId) -> StoreResult<Vec<RoleGrant>> {
        let rows = sqlx::query_as::<_, DbRoleGrant>(
            r#"SELECT a.id AS action_id, a.name AS action_name,
                      r.id AS resource_id, r.name AS resource_name
               FROM role_grants g
               JOIN permission_actions a ON a.id = g.action_id
               JOIN permission_resources r ON r.id = a.resource_id
               WHERE g.role_id = $1"#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RoleGrant::from).collect())
    }

    // -----------------------------
    // Sessions
    // -----------------------------

    async fn create_session(&self, session: UserSession) -> StoreResult<UserSession> {
        let insert = sqlx::query(
            r#"INSERT INTO user_sessions (id, user_id, refresh_token, created_at, expires_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(session.id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(&session.refresh_token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await;
        if let Err(err) = insert {
            if is_unique_violation(&err) {
                return Err(StoreError::Conflict("refresh token exists".into()));
            }
            if is_foreign_key_violation(&err) {
                return Err(StoreError::NotFound("user".into()));
            }
            return Err(err.into());
        }
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> StoreResult<Option<UserSession>> {
        let row = sqlx::query_as::<_, DbSession>(
            r#"SELECT id, user_id, refresh_token, created_at, expires_at
               FROM user_sessions WHERE id = $1"#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserSession::from))
    }

    async fn find_session_by_refresh_token(
        &self,
        token: &str,
    ) -> StoreResult<Option<UserSession>> {
        let row = sqlx::query_as::<_, DbSession>(
            r#"SELECT id, user_id, refresh_token, created_at, expires_at
               FROM user_sessions WHERE refresh_token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserSession::from))
    }

    async fn list_sessions_by_user(&self, user_id: UserId) -> StoreResult<Vec<UserSession>> {
        let rows = sqlx::query_as::<_, DbSession>(
            r#"SELECT id, user_id, refresh_token, created_at, expires_at
               FROM user_sessions WHERE user_id = $1 ORDER BY created_at"#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserSession::from).collect())
    }

    async fn delete_session(&self, id: SessionId) -> StoreResult<()> {
        let done = sqlx::query("DELETE FROM user_sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("session".into()));
        }
        Ok(())
    }

    async fn delete_sessions_by_user(&self, user_id: UserId) -> StoreResult<u64> {
        let done = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    // -----------------------------
    // Articles
    // -----------------------------

    async fn list_articles(&self, query: ArticleQuery) -> StoreResult<ArticlePage> {
        // The total runs against the same filters as the page so pagination
        // UIs can trust it.
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM articles");
        push_article_filters(&mut count_builder, &query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        // Sort column and direction come from closed enums, never from raw
        // client strings.
        let sort_column = match query.sort {
            ArticleSortField::CreatedAt => "created_at",
            ArticleSortField::UpdatedAt => "updated_at",
        };
        let direction = match query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let page_size = self.config.page_limit(query.page_size) as i64;
        let offset = (query.page.max(1) as i64 - 1).saturating_mul(page_size);

        let mut builder = QueryBuilder::new(
            "SELECT id, title, body, author_id, created_at, updated_at FROM articles",
        );
        push_article_filters(&mut builder, &query);
        builder.push(format!(" ORDER BY {sort_column} {direction}, id ASC"));
        builder.push(" LIMIT ");
        builder.push_bind(page_size);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
        let rows: Vec<DbArticle> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(ArticlePage {
            items: rows.into_iter().map(Article::from).collect(),
            total: total as u64,
        })
    }

    async fn get_article(&self, id: ArticleId) -> StoreResult<Option<Article>> {
        let row = sqlx::query_as::<_, DbArticle>(
            r#"SELECT id, title, body, author_id, created_at, updated_at
               FROM articles WHERE id = $1"#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Article::from))
    }

    async fn create_article(&self, article: Article) -> StoreResult<Article> {
        let insert = sqlx::query(
            r#"INSERT INTO articles (id, title, body, author_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(article.id.as_uuid())
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.author_id.as_uuid())
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(&self.pool)
        .await;
        if let Err(err) = insert {
            if is_foreign_key_violation(&err) {
                return Err(StoreError::NotFound("user".into()));
            }
            return Err(err.into());
        }
        Ok(article)
    }

    async fn update_article(&self, article: Article) -> StoreResult<Article> {
        let result = sqlx::query(
            r#"UPDATE articles
               SET title = $2, body = $3, author_id = $4, updated_at = $5
               WHERE id = $1"#,
        )
        .bind(article.id.as_uuid())
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.author_id.as_uuid())
        .bind(article.updated_at)
        .execute(&self.pool)
        .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound("article".into())),
            Ok(_) => Ok(article),
            Err(err) if is_foreign_key_violation(&err) => {
                Err(StoreError::NotFound("user".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_article(&self, id: ArticleId) -> StoreResult<()> {
        let done = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("article".into()));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        // A trivial round-trip proves pool and server are reachable.
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_done\\"), "50\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn article_filters_compose_where_clauses() {
        let query = ArticleQuery {
            page: 1,
            page_size: 10,
            title: Some("notes".into()),
            author_id: Some(UserId::new()),
            sort: ArticleSortField::CreatedAt,
            order: SortOrder::Desc,
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        push_article_filters(&mut builder, &query);
        let sql = builder.sql();
        assert!(sql.contains("WHERE author_id ="));
        assert!(sql.contains("AND title ILIKE"));

        let query = ArticleQuery {
            page: 1,
            page_size: 10,
            title: None,
            author_id: None,
            sort: ArticleSortField::CreatedAt,
            order: SortOrder::Desc,
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        push_article_filters(&mut builder, &query);
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM articles");
    }
}
