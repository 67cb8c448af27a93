// Permission resource/action bindings.
use crate::client::AdminClient;
use crate::error::ClientError;
use crate::types::{ActionUpdate, ItemsResponse, NameUpsert, PermissionAction, PermissionResource};
use atrium_common::ids::{ActionId, ResourceId};

pub struct PermissionsClient<'a> {
    pub(crate) inner: &'a AdminClient,
}

impl PermissionsClient<'_> {
    pub async fn list_resources(&self) -> Result<Vec<PermissionResource>, ClientError> {
        let response: ItemsResponse<PermissionResource> =
            self.inner.get_json("v1/permission-resources").await?;
        Ok(response.items)
    }

    pub async fn create_resource(
        &self,
        name: impl Into<String>,
    ) -> Result<PermissionResource, ClientError> {
        self.inner
            .post_json("v1/permission-resources", &NameUpsert { name: name.into() })
            .await
    }

    pub async fn get_resource(
        &self,
        id: ResourceId,
    ) -> Result<Option<PermissionResource>, ClientError> {
        self.inner
            .get_optional(&format!("v1/permission-resources/{id}"))
            .await
    }

    pub async fn update_resource(
        &self,
        id: ResourceId,
        name: impl Into<String>,
    ) -> Result<PermissionResource, ClientError> {
        self.inner
            .put_json(
                &format!("v1/permission-resources/{id}"),
                &NameUpsert { name: name.into() },
            )
            .await
    }

    pub async fn delete_resource(&self, id: ResourceId) -> Result<(), ClientError> {
        self.inner
            .delete_unit(&format!("v1/permission-resources/{id}"))
            .await
    }

    pub async fn list_actions(
        &self,
        resource_id: ResourceId,
    ) -> Result<Vec<PermissionAction>, ClientError> {
        let response: ItemsResponse<PermissionAction> = self
            .inner
            .get_json(&format!("v1/permission-resources/{resource_id}/actions"))
            .await?;
        Ok(response.items)
    }

    pub async fn create_action(
        &self,
        resource_id: ResourceId,
        name: impl Into<String>,
    ) -> Result<PermissionAction, ClientError> {
        self.inner
            .post_json(
                &format!("v1/permission-resources/{resource_id}/actions"),
                &NameUpsert { name: name.into() },
            )
            .await
    }

    pub async fn get_action(&self, id: ActionId) -> Result<Option<PermissionAction>, ClientError> {
        self.inner
            .get_optional(&format!("v1/permission-actions/{id}"))
            .await
    }

    pub async fn update_action(
        &self,
        id: ActionId,
        request: &ActionUpdate,
    ) -> Result<PermissionAction, ClientError> {
        self.inner
            .put_json(&format!("v1/permission-actions/{id}"), request)
            .await
    }

    pub async fn delete_action(&self, id: ActionId) -> Result<(), ClientError> {
        self.inner
            .delete_unit(&format!("v1/permission-actions/{id}"))
            .await
    }
}
