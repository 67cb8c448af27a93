// Article bindings, including the paginated list operation.
use crate::client::AdminClient;
use crate::error::ClientError;
use crate::types::{Article, ArticleListQuery, ArticlePage, ArticleUpsert};
use atrium_common::ids::ArticleId;

pub struct ArticlesClient<'a> {
    pub(crate) inner: &'a AdminClient,
}

impl ArticlesClient<'_> {
    /// One page of articles plus the total match count for the filter.
    pub async fn list(&self, query: &ArticleListQuery) -> Result<ArticlePage, ClientError> {
        self.inner
            .get_json_with_params("v1/articles", &query.to_params())
            .await
    }

    pub async fn create(&self, request: &ArticleUpsert) -> Result<Article, ClientError> {
        self.inner.post_json("v1/articles", request).await
    }

    pub async fn get(&self, id: ArticleId) -> Result<Option<Article>, ClientError> {
        self.inner.get_optional(&format!("v1/articles/{id}")).await
    }

    pub async fn update(
        &self,
        id: ArticleId,
        request: &ArticleUpsert,
    ) -> Result<Article, ClientError> {
        self.inner
            .put_json(&format!("v1/articles/{id}"), request)
            .await
    }

    pub async fn delete(&self, id: ArticleId) -> Result<(), ClientError> {
        self.inner.delete_unit(&format!("v1/articles/{id}")).await
    }
}
