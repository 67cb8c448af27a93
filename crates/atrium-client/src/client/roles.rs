// Role bindings, including the assembled permissions projection.
use crate::client::AdminClient;
use crate::error::ClientError;
use crate::types::{ItemsResponse, NameUpsert, Role, RolePermissions};
use atrium_common::ids::{ActionId, RoleId};

pub struct RolesClient<'a> {
    pub(crate) inner: &'a AdminClient,
}

impl RolesClient<'_> {
    pub async fn list(&self) -> Result<Vec<Role>, ClientError> {
        let response: ItemsResponse<Role> = self.inner.get_json("v1/roles").await?;
        Ok(response.items)
    }

    pub async fn create(&self, name: impl Into<String>) -> Result<Role, ClientError> {
        self.inner
            .post_json("v1/roles", &NameUpsert { name: name.into() })
            .await
    }

    pub async fn get(&self, id: RoleId) -> Result<Option<Role>, ClientError> {
        self.inner.get_optional(&format!("v1/roles/{id}")).await
    }

    pub async fn update(&self, id: RoleId, name: impl Into<String>) -> Result<Role, ClientError> {
        self.inner
            .put_json(&format!("v1/roles/{id}"), &NameUpsert { name: name.into() })
            .await
    }

    pub async fn delete(&self, id: RoleId) -> Result<(), ClientError> {
        self.inner.delete_unit(&format!("v1/roles/{id}")).await
    }

    /// The materialized access matrix for the role: one entry per resource,
    /// actions deduplicated and name-sorted.
    pub async fn permissions(&self, id: RoleId) -> Result<Option<RolePermissions>, ClientError> {
        self.inner
            .get_optional(&format!("v1/roles/{id}/permissions"))
            .await
    }

    pub async fn grant(&self, id: RoleId, action_id: ActionId) -> Result<(), ClientError> {
        self.inner
            .put_unit(&format!("v1/roles/{id}/permissions/{action_id}"))
            .await
    }

    pub async fn revoke(&self, id: RoleId, action_id: ActionId) -> Result<(), ClientError> {
        self.inner
            .delete_unit(&format!("v1/roles/{id}/permissions/{action_id}"))
            .await
    }
}
