// Core HTTP plumbing shared by the per-entity sub-clients.
use crate::config::ClientConfig;
use crate::error::ClientError;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

mod articles;
mod permissions;
mod roles;
mod sessions;
mod system;
mod users;

pub use articles::ArticlesClient;
pub use permissions::PermissionsClient;
pub use roles::RolesClient;
pub use sessions::SessionsClient;
pub use system::SystemClient;
pub use users::UsersClient;

/// Entry point holding the connection pool and configuration.
///
/// Cheap to clone; sub-clients borrow it and bind one server operation per
/// method.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AdminClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn users(&self) -> UsersClient<'_> {
        UsersClient { inner: self }
    }

    pub fn roles(&self) -> RolesClient<'_> {
        RolesClient { inner: self }
    }

    pub fn permissions(&self) -> PermissionsClient<'_> {
        PermissionsClient { inner: self }
    }

    pub fn articles(&self) -> ArticlesClient<'_> {
        ArticlesClient { inner: self }
    }

    pub fn sessions(&self) -> SessionsClient<'_> {
        SessionsClient { inner: self }
    }

    pub fn system(&self) -> SystemClient<'_> {
        SystemClient { inner: self }
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        // Paths are relative so a deployment can mount the API under a
        // prefix; the config normalized the base to a trailing slash.
        self.config
            .base_url
            .join(path)
            .map_err(|err| ClientError::Config(format!("invalid endpoint {path}: {err}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        let mut builder = self.http.request(method, self.endpoint(path)?);
        if let Some(token) = &self.config.bearer_token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(ClientError::from_body(status.as_u16(), &body))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path)?.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// GET with not-found mapped to `None`, the repository `null` contract.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ClientError> {
        let response = self.request(Method::GET, path)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    pub(crate) async fn get_json_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path)?.query(params).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// POST with not-found mapped to `None`; used by the refresh-token
    /// lookup, which is a read that travels as a POST to keep the secret out
    /// of URLs.
    pub(crate) async fn post_json_optional<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ClientError> {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::PUT, path)?.json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub(crate) async fn put_json_unit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let response = self.request(Method::PUT, path)?.json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn put_unit(&self, path: &str) -> Result<(), ClientError> {
        let response = self.request(Method::PUT, path)?.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> Result<(), ClientError> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client(base: &str) -> AdminClient {
        AdminClient::new(ClientConfig::new(base).expect("config")).expect("client")
    }

    #[test]
    fn endpoints_preserve_deployment_prefixes() {
        let client = make_client("http://localhost:8080");
        assert_eq!(
            client.endpoint("v1/users").expect("url").as_str(),
            "http://localhost:8080/v1/users"
        );

        let client = make_client("http://gateway.internal/admin-api");
        assert_eq!(
            client.endpoint("v1/roles/abc").expect("url").as_str(),
            "http://gateway.internal/admin-api/v1/roles/abc"
        );
    }
}
