//! A deduplicated set of permissions.

use std::collections::{HashMap, HashSet};

use warden_core::types::PermissionId;
use warden_entity::permission::Permission;

/// The permissions reachable from a subject or group.
///
/// Membership is by permission identity. Order is not meaningful.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    permissions: HashMap<PermissionId, Permission>,
    /// Token lookup index over `permissions`.
    by_token: HashMap<String, PermissionId>,
}

impl PermissionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission. Returns `false` if it was already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        if self.permissions.contains_key(&permission.id) {
            return false;
        }
        self.by_token.insert(permission.token.clone(), permission.id);
        self.permissions.insert(permission.id, permission);
        true
    }

    /// Whether the set holds the permission with this id.
    pub fn contains(&self, id: PermissionId) -> bool {
        self.permissions.contains_key(&id)
    }

    /// Whether any permission in the set carries `token`.
    pub fn contains_token(&self, token: &str) -> bool {
        self.by_token.contains_key(token)
    }

    /// The tokens of every permission in the set.
    pub fn tokens(&self) -> HashSet<&str> {
        self.by_token.keys().map(String::as_str).collect()
    }

    /// Iterates over the permissions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    /// Number of distinct permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl PartialEq for PermissionSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.permissions.keys().all(|id| other.contains(*id))
    }
}

impl Eq for PermissionSet {}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        for permission in iter {
            self.insert(permission);
        }
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::hash_map::IntoValues<PermissionId, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.into_values()
    }
}
