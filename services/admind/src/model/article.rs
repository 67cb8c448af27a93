//! Article model definitions and list-query payloads.
use atrium_common::ids::{ArticleId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter, sort, and pagination inputs for the article list operation.
///
/// `page` is 1-based. The `title` filter matches case-insensitive
/// substrings. Sorting ties are broken by id so pages are stable.
#[derive(Debug, Clone)]
pub struct ArticleQuery {
    pub page: u32,
    pub page_size: u32,
    pub title: Option<String>,
    pub author_id: Option<UserId>,
    pub sort: ArticleSortField,
    pub order: SortOrder,
}

/// One page of results plus the total match count for pagination UIs.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub items: Vec<Article>,
    pub total: u64,
}
