// Client-side defaults and connection configuration.
use crate::error::ClientError;
use std::time::Duration;
use url::Url;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`crate::AdminClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Attached as `Authorization: Bearer ...` when present. The server only
    /// uses it for request attribution; authorization lives upstream.
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| ClientError::Config(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base url cannot be a base: {base_url}"
            )));
        }
        // Normalize to a trailing slash so relative joins keep any path
        // prefix the deployment mounts the API under.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_url_and_defaults() {
        let config = ClientConfig::new("http://localhost:8080").expect("config");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.bearer_token.is_none());

        let config = config
            .with_bearer_token("token")
            .with_timeout(Duration::from_secs(1));
        assert_eq!(config.bearer_token.as_deref(), Some("token"));
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn rejects_invalid_base_urls() {
        assert!(ClientConfig::new("not a url").is_err());
        assert!(ClientConfig::new("mailto:admin@example.com").is_err());
    }
}
