// User bindings: one method per users-repository operation.
use crate::client::AdminClient;
use crate::error::ClientError;
use crate::types::{
    ItemsResponse, Role, SessionsDeleted, User, UserCreate, UserRoles, UserSession, UserUpdate,
};
use atrium_common::ids::{RoleId, UserId};

pub struct UsersClient<'a> {
    pub(crate) inner: &'a AdminClient,
}

impl UsersClient<'_> {
    pub async fn list(&self) -> Result<Vec<User>, ClientError> {
        let response: ItemsResponse<User> = self.inner.get_json("v1/users").await?;
        Ok(response.items)
    }

    pub async fn create(&self, request: &UserCreate) -> Result<User, ClientError> {
        self.inner.post_json("v1/users", request).await
    }

    pub async fn get(&self, id: UserId) -> Result<Option<User>, ClientError> {
        self.inner.get_optional(&format!("v1/users/{id}")).await
    }

    pub async fn update(&self, id: UserId, request: &UserUpdate) -> Result<User, ClientError> {
        self.inner.put_json(&format!("v1/users/{id}"), request).await
    }

    pub async fn delete(&self, id: UserId) -> Result<(), ClientError> {
        self.inner.delete_unit(&format!("v1/users/{id}")).await
    }

    pub async fn roles(&self, id: UserId) -> Result<Vec<Role>, ClientError> {
        let response: ItemsResponse<Role> =
            self.inner.get_json(&format!("v1/users/{id}/roles")).await?;
        Ok(response.items)
    }

    /// Replace the user's full role assignment set.
    pub async fn set_roles(&self, id: UserId, roles: Vec<RoleId>) -> Result<(), ClientError> {
        self.inner
            .put_json_unit(&format!("v1/users/{id}/roles"), &UserRoles { roles })
            .await
    }

    pub async fn sessions(&self, id: UserId) -> Result<Vec<UserSession>, ClientError> {
        let response: ItemsResponse<UserSession> = self
            .inner
            .get_json(&format!("v1/users/{id}/sessions"))
            .await?;
        Ok(response.items)
    }

    /// Remove every session the user owns, returning how many went away.
    pub async fn delete_sessions(&self, id: UserId) -> Result<u64, ClientError> {
        let response: SessionsDeleted = self
            .inner
            .delete_json(&format!("v1/users/{id}/sessions"))
            .await?;
        Ok(response.deleted)
    }
}
