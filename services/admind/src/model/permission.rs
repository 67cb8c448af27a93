//! Permission model definitions.
//!
//! # Purpose
//! Defines the normalized resource/action records of the access-control
//! matrix and the assembled per-role projection. Actions carry an explicit
//! reference to their parent resource; an action is meaningful only in that
//! resource's context.
use crate::model::Role;
use atrium_common::ids::{ActionId, ResourceId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct PermissionResource {
    pub id: ResourceId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct PermissionAction {
    pub id: ActionId,
    pub resource_id: ResourceId,
    pub name: String,
}

/// One joined grant row: an action a role holds, with its parent resource.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub resource: PermissionResource,
    pub action: PermissionAction,
}

/// All actions a role holds on one resource, deduplicated and name-sorted.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ResourceGrant {
    pub resource: PermissionResource,
    pub actions: Vec<PermissionAction>,
}

/// The materialized access matrix for one role.
///
/// Invariant: exactly one entry per distinct resource the role has any
/// action on; entries are ordered by resource name.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct RolePermissions {
    pub role: Role,
    pub entries: Vec<ResourceGrant>,
}
