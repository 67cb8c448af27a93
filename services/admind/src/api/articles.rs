//! Article API handlers.
//!
//! # Purpose
//! Implements article CRUD and the paginated, filterable, sortable list
//! endpoint that reports a total match count for pagination UIs.
use crate::api::error::{ApiError, api_internal, api_not_found, api_validation_error};
use crate::api::types::{
    ArticleCreateRequest, ArticleListParams, ArticleListResponse, ArticleUpdateRequest,
};
use crate::app::AppState;
use crate::model::{Article, ArticleQuery};
use crate::store::StoreError;
use atrium_common::ids::ArticleId;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

const DEFAULT_PAGE_SIZE: u32 = 20;

fn query_from_params(params: ArticleListParams, max_page_size: u32) -> Result<ArticleQuery, ApiError> {
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(api_validation_error("page is 1-based"));
    }
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 || page_size > max_page_size {
        return Err(api_validation_error(&format!(
            "page_size must be between 1 and {max_page_size}"
        )));
    }
    Ok(ArticleQuery {
        page,
        page_size,
        title: params.title,
        author_id: params.author_id,
        sort: params.sort.unwrap_or_default(),
        order: params.order.unwrap_or_default(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/articles",
    tag = "articles",
    params(ArticleListParams),
    responses(
        (status = 200, description = "One page of articles plus the total match count", body = ArticleListResponse),
        (status = 400, description = "Invalid pagination inputs", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_articles(
    Query(params): Query<ArticleListParams>,
    State(state): State<AppState>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let query = query_from_params(params, state.max_page_size)?;
    let page = query.page;
    let page_size = query.page_size;
    let result = state
        .store
        .list_articles(query)
        .await
        .map_err(|err| api_internal("failed to list articles", &err))?;
    Ok(Json(ArticleListResponse {
        items: result.items,
        total: result.total,
        page,
        page_size,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/articles",
    tag = "articles",
    request_body = ArticleCreateRequest,
    responses(
        (status = 201, description = "Article created", body = Article),
        (status = 404, description = "Author not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_article(
    State(state): State<AppState>,
    Json(body): Json<ArticleCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let article = Article {
        id: ArticleId::new(),
        title: body.title,
        body: body.body,
        author_id: body.author_id,
        created_at: now,
        updated_at: now,
    };
    match state.store.create_article(article).await {
        Ok(article) => Ok((StatusCode::CREATED, Json(article))),
        Err(StoreError::NotFound(_)) => Err(api_not_found("author not found")),
        Err(err) => Err(api_internal("failed to create article", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/articles/{article_id}",
    tag = "articles",
    params(("article_id" = ArticleId, Path, description = "Article identifier")),
    responses(
        (status = 200, description = "Article", body = Article),
        (status = 404, description = "Article not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_article(
    Path(article_id): Path<ArticleId>,
    State(state): State<AppState>,
) -> Result<Json<Article>, ApiError> {
    let article = state
        .store
        .get_article(article_id)
        .await
        .map_err(|err| api_internal("failed to load article", &err))?
        .ok_or_else(|| api_not_found("article not found"))?;
    Ok(Json(article))
}

#[utoipa::path(
    put,
    path = "/v1/articles/{article_id}",
    tag = "articles",
    params(("article_id" = ArticleId, Path, description = "Article identifier")),
    request_body = ArticleUpdateRequest,
    responses(
        (status = 200, description = "Article updated", body = Article),
        (status = 404, description = "Article or author not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_article(
    Path(article_id): Path<ArticleId>,
    State(state): State<AppState>,
    Json(body): Json<ArticleUpdateRequest>,
) -> Result<Json<Article>, ApiError> {
    // Full-record update: load the current record to keep its creation
    // timestamp, then replace everything else.
    let existing = state
        .store
        .get_article(article_id)
        .await
        .map_err(|err| api_internal("failed to load article", &err))?
        .ok_or_else(|| api_not_found("article not found"))?;
    let article = Article {
        id: existing.id,
        title: body.title,
        body: body.body,
        author_id: body.author_id,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };
    match state.store.update_article(article).await {
        Ok(article) => Ok(Json(article)),
        Err(StoreError::NotFound(what)) => Err(api_not_found(&format!("{what} not found"))),
        Err(err) => Err(api_internal("failed to update article", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/articles/{article_id}",
    tag = "articles",
    params(("article_id" = ArticleId, Path, description = "Article identifier")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 404, description = "Article not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_article(
    Path(article_id): Path<ArticleId>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete_article(article_id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(api_not_found("article not found")),
        Err(err) => Err(api_internal("failed to delete article", &err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_params() {
        let query = query_from_params(ArticleListParams::default(), 100).expect("query");
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert!(query.title.is_none());
        assert!(query.author_id.is_none());
    }

    #[test]
    fn zero_page_and_oversized_page_size_are_rejected() {
        let params = ArticleListParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(query_from_params(params, 100).is_err());

        let params = ArticleListParams {
            page_size: Some(101),
            ..Default::default()
        };
        assert!(query_from_params(params, 100).is_err());

        let params = ArticleListParams {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(query_from_params(params, 100).is_err());
    }
}
