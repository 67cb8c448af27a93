//! Admin service data model module.
//!
//! # Purpose
//! Re-exports the core user/role/permission/article/session models used by
//! the API and store layers.
mod article;
mod permission;
mod role;
mod session;
mod user;

pub use article::{Article, ArticlePage, ArticleQuery, ArticleSortField, SortOrder};
pub use permission::{
    PermissionAction, PermissionResource, ResourceGrant, RoleGrant, RolePermissions,
};
pub use role::Role;
pub use session::UserSession;
pub use user::User;
