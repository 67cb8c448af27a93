// Payload shapes exchanged with the admin API.
//
// These mirror the server's wire contract; the client keeps its own copies
// so consumers do not link the service crate.
use atrium_common::ids::{ActionId, ArticleId, ResourceId, RoleId, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionResource {
    pub id: ResourceId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionAction {
    pub id: ActionId,
    pub resource_id: ResourceId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceGrant {
    pub resource: PermissionResource,
    pub actions: Vec<PermissionAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolePermissions {
    pub role: Role,
    pub entries: Vec<ResourceGrant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdate {
    pub email: String,
    pub display_name: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameUpsert {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionUpdate {
    pub resource_id: ResourceId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleUpsert {
    pub title: String,
    pub body: String,
    pub author_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSortField {
    CreatedAt,
    UpdatedAt,
}

impl ArticleSortField {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ArticleSortField::CreatedAt => "created_at",
            ArticleSortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filter/sort/pagination inputs for the article list binding.
#[derive(Debug, Clone, Default)]
pub struct ArticleListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub title: Option<String>,
    pub author_id: Option<UserId>,
    pub sort: Option<ArticleSortField>,
    pub order: Option<SortOrder>,
}

impl ArticleListQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size", page_size.to_string()));
        }
        if let Some(title) = &self.title {
            params.push(("title", title.clone()));
        }
        if let Some(author_id) = self.author_id {
            params.push(("author_id", author_id.to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.as_str().to_string()));
        }
        if let Some(order) = self.order {
            params.push(("order", order.as_str().to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticlePage {
    pub items: Vec<Article>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionCreate {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionLookup {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsDeleted {
    pub deleted: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRoles {
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub durable_storage: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    pub api_version: String,
    pub backend: String,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_query_params_serialize_in_wire_format() {
        let author = UserId::new();
        let query = ArticleListQuery {
            page: Some(2),
            page_size: Some(10),
            title: Some("digest".to_string()),
            author_id: Some(author),
            sort: Some(ArticleSortField::UpdatedAt),
            order: Some(SortOrder::Asc),
        };
        let params = query.to_params();
        assert!(params.contains(&("page", "2".to_string())));
        assert!(params.contains(&("page_size", "10".to_string())));
        assert!(params.contains(&("title", "digest".to_string())));
        assert!(params.contains(&("author_id", author.to_string())));
        assert!(params.contains(&("sort", "updated_at".to_string())));
        assert!(params.contains(&("order", "asc".to_string())));
    }

    #[test]
    fn empty_article_query_has_no_params() {
        assert!(ArticleListQuery::default().to_params().is_empty());
    }
}
