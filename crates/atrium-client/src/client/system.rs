// Service identity and health bindings.
use crate::client::AdminClient;
use crate::error::ClientError;
use crate::types::{HealthStatus, SystemInfo};

pub struct SystemClient<'a> {
    pub(crate) inner: &'a AdminClient,
}

impl SystemClient<'_> {
    pub async fn info(&self) -> Result<SystemInfo, ClientError> {
        self.inner.get_json("v1/system/info").await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.inner.get_json("v1/system/health").await
    }
}
