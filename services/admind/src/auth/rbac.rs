//! RBAC view assembly helpers.
//!
//! # Purpose and responsibility
//! Folds the normalized (role, resource, action) grant rows into the
//! per-role access matrix served by the API.
//!
//! # Where it fits in Atrium
//! Used by the role permissions endpoint to produce the materialized
//! `RolePermissions` projection, and by callers that need membership checks
//! against an assembled view.
//!
//! # Key invariants and assumptions
//! - Exactly one entry per distinct resource the role has any action on.
//! - The action collection of an entry is the set union of granted actions
//!   for that (role, resource) pair; duplicates collapse.
//! - Entries are ordered by resource name and actions by action name so the
//!   projection is deterministic.
use crate::model::{PermissionAction, ResourceGrant, Role, RoleGrant, RolePermissions};
use std::collections::BTreeMap;

/// Assemble the materialized access matrix for one role.
///
/// # What it does
/// Groups joined grant rows by resource, deduplicates actions, and sorts
/// both levels by name.
///
/// # Why it exists
/// Keeps the grouping semantics in one place so every caller sees the same
/// projection shape regardless of store backend.
///
/// # Invariants
/// - The output never contains two entries for the same resource.
pub fn assemble_role_permissions(role: Role, grants: Vec<RoleGrant>) -> RolePermissions {
    // Step 1: Group actions under their resource, keyed by resource name so
    // the final entry order falls out of the map traversal.
    let mut grouped: BTreeMap<String, ResourceGrant> = BTreeMap::new();
    for grant in grants {
        let entry = grouped
            .entry(grant.resource.name.clone())
            .or_insert_with(|| ResourceGrant {
                resource: grant.resource.clone(),
                actions: Vec::new(),
            });
        // Step 2: Union semantics, so a duplicate grant row never produces a
        // duplicate action.
        if !entry.actions.iter().any(|action| action.id == grant.action.id) {
            entry.actions.push(grant.action);
        }
    }

    // Step 3: Order actions by name inside each entry.
    let entries = grouped
        .into_values()
        .map(|mut entry| {
            entry.actions.sort_by(|a, b| a.name.cmp(&b.name));
            entry
        })
        .collect();

    RolePermissions { role, entries }
}

/// Whether an assembled view grants `action` on `resource`.
pub fn role_allows(permissions: &RolePermissions, resource: &str, action: &str) -> bool {
    permissions.entries.iter().any(|entry| {
        entry.resource.name == resource
            && entry
                .actions
                .iter()
                .any(|granted| granted.name == action)
    })
}
