//! Materialized slice of the authorization graph.

use std::collections::HashMap;

use warden_core::result::AppResult;
use warden_core::types::{PermissionBundleId, UserGroupId};
use warden_entity::graph::PermissionGraph;
use warden_entity::permission::Permission;

/// The edges below a set of groups, loaded once and then read without I/O.
///
/// Groups and bundles missing from the snapshot resolve to no
/// permissions: a snapshot only knows what was loaded into it.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    group_permissions: HashMap<UserGroupId, Vec<Permission>>,
    group_bundles: HashMap<UserGroupId, Vec<PermissionBundleId>>,
    bundle_permissions: HashMap<PermissionBundleId, Vec<Permission>>,
}

impl GraphSnapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a direct group → permission edge.
    pub fn add_group_permission(&mut self, group: UserGroupId, permission: Permission) {
        self.group_permissions
            .entry(group)
            .or_default()
            .push(permission);
    }

    /// Records a group → bundle edge.
    pub fn add_group_bundle(&mut self, group: UserGroupId, bundle: PermissionBundleId) {
        self.group_bundles.entry(group).or_default().push(bundle);
    }

    /// Records a bundle → permission edge.
    pub fn add_bundle_permission(&mut self, bundle: PermissionBundleId, permission: Permission) {
        self.bundle_permissions
            .entry(bundle)
            .or_default()
            .push(permission);
    }

    /// Whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.group_permissions.is_empty()
            && self.group_bundles.is_empty()
            && self.bundle_permissions.is_empty()
    }
}

impl PermissionGraph for GraphSnapshot {
    fn group_permissions(&self, group: UserGroupId) -> AppResult<Vec<Permission>> {
        Ok(self
            .group_permissions
            .get(&group)
            .cloned()
            .unwrap_or_default())
    }

    fn group_bundles(&self, group: UserGroupId) -> AppResult<Vec<PermissionBundleId>> {
        Ok(self.group_bundles.get(&group).cloned().unwrap_or_default())
    }

    fn bundle_permissions(&self, bundle: PermissionBundleId) -> AppResult<Vec<Permission>> {
        Ok(self
            .bundle_permissions
            .get(&bundle)
            .cloned()
            .unwrap_or_default())
    }
}
