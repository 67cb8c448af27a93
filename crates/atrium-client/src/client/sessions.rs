// Session bindings: credential-checked creation, lookup, deletion.
use crate::client::AdminClient;
use crate::error::ClientError;
use crate::types::{SessionCreate, SessionLookup, UserSession};
use atrium_common::ids::SessionId;

pub struct SessionsClient<'a> {
    pub(crate) inner: &'a AdminClient,
}

impl SessionsClient<'_> {
    /// Verify credentials and open a session carrying a fresh refresh token.
    pub async fn create(&self, request: &SessionCreate) -> Result<UserSession, ClientError> {
        self.inner.post_json("v1/sessions", request).await
    }

    /// Find the session holding exactly this refresh token, if any. The
    /// token travels in the request body, never in the URL.
    pub async fn lookup(&self, refresh_token: impl Into<String>) -> Result<Option<UserSession>, ClientError> {
        self.inner
            .post_json_optional(
                "v1/sessions/lookup",
                &SessionLookup {
                    refresh_token: refresh_token.into(),
                },
            )
            .await
    }

    pub async fn get(&self, id: SessionId) -> Result<Option<UserSession>, ClientError> {
        self.inner.get_optional(&format!("v1/sessions/{id}")).await
    }

    pub async fn delete(&self, id: SessionId) -> Result<(), ClientError> {
        self.inner.delete_unit(&format!("v1/sessions/{id}")).await
    }
}
