//! In-memory entity store guarded by a single read/write lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{PermissionBundleId, PermissionId, SubjectId, UserGroupId};
use warden_entity::graph::{AuthorizationSubject, PermissionGraph};
use warden_entity::group::{CreateUserGroup, UserGroup};
use warden_entity::permission::{
    CreatePermission, CreatePermissionBundle, Permission, PermissionBundle,
};
use warden_entity::subject::{CreateSubject, Subject};

use super::link::LinkTable;
use crate::snapshot::GraphSnapshot;

/// Rows and edges of all four collections.
#[derive(Debug)]
struct GraphState {
    permissions: BTreeMap<PermissionId, Permission>,
    /// Uniqueness index over `Permission.token`.
    tokens: HashMap<String, PermissionId>,
    bundles: BTreeMap<PermissionBundleId, PermissionBundle>,
    groups: BTreeMap<UserGroupId, UserGroup>,
    subjects: BTreeMap<SubjectId, Subject>,
    group_permissions: LinkTable<UserGroupId, PermissionId>,
    group_bundles: LinkTable<UserGroupId, PermissionBundleId>,
    bundle_permissions: LinkTable<PermissionBundleId, PermissionId>,
    subject_groups: LinkTable<SubjectId, UserGroupId>,
}

impl GraphState {
    fn new() -> Self {
        Self {
            permissions: BTreeMap::new(),
            tokens: HashMap::new(),
            bundles: BTreeMap::new(),
            groups: BTreeMap::new(),
            subjects: BTreeMap::new(),
            group_permissions: LinkTable::new(),
            group_bundles: LinkTable::new(),
            bundle_permissions: LinkTable::new(),
            subject_groups: LinkTable::new(),
        }
    }

    fn require_permission(&self, id: PermissionId) -> AppResult<()> {
        if self.permissions.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Permission {id} not found")))
        }
    }

    fn require_bundle(&self, id: PermissionBundleId) -> AppResult<()> {
        if self.bundles.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Permission bundle {id} not found")))
        }
    }

    fn require_group(&self, id: UserGroupId) -> AppResult<()> {
        if self.groups.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("User group {id} not found")))
        }
    }

    fn require_subject(&self, id: SubjectId) -> AppResult<()> {
        if self.subjects.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Subject {id} not found")))
        }
    }

    fn permissions_for(&self, ids: Vec<PermissionId>) -> Vec<Permission> {
        ids.into_iter()
            .filter_map(|id| self.permissions.get(&id).cloned())
            .collect()
    }
}

/// An in-process entity store for the authorization graph.
///
/// Enforces the same integrity rules a relational store would: unique
/// permission tokens, edges only between existing rows, and cascading
/// edge deletion when a row is removed. Entities on the far side of a
/// deleted edge are never touched.
#[derive(Debug)]
pub struct MemoryEntityStore {
    state: RwLock<GraphState>,
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GraphState::new()),
        }
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, GraphState>> {
        self.state
            .read()
            .map_err(|_| AppError::internal("Entity store lock poisoned"))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, GraphState>> {
        self.state
            .write()
            .map_err(|_| AppError::internal("Entity store lock poisoned"))
    }

    // -- Permissions --

    /// Inserts a permission. Fails with `Conflict` if the token is taken.
    pub fn create_permission(&self, input: CreatePermission) -> AppResult<Permission> {
        input.validate()?;
        let mut state = self.write()?;
        if state.tokens.contains_key(&input.token) {
            return Err(AppError::conflict(format!(
                "Permission token '{}' already exists",
                input.token
            )));
        }

        let permission = input.into_permission();
        state
            .tokens
            .insert(permission.token.clone(), permission.id);
        state.permissions.insert(permission.id, permission.clone());
        debug!(permission_id = %permission.id, token = %permission.token, "Permission created");
        Ok(permission)
    }

    /// Inserts several permissions; stops at the first failure.
    pub fn create_permissions(
        &self,
        inputs: impl IntoIterator<Item = CreatePermission>,
    ) -> AppResult<Vec<Permission>> {
        inputs
            .into_iter()
            .map(|input| self.create_permission(input))
            .collect()
    }

    /// Looks up a permission by id.
    pub fn permission(&self, id: PermissionId) -> AppResult<Permission> {
        self.read()?
            .permissions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))
    }

    /// Looks up a permission by its token.
    pub fn find_permission_by_token(&self, token: &str) -> AppResult<Option<Permission>> {
        let state = self.read()?;
        Ok(state
            .tokens
            .get(token)
            .and_then(|id| state.permissions.get(id))
            .cloned())
    }

    /// Every permission in the store.
    pub fn permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.read()?.permissions.values().cloned().collect())
    }

    /// Deletes a permission and every edge pointing at it.
    pub fn delete_permission(&self, id: PermissionId) -> AppResult<bool> {
        let mut state = self.write()?;
        let Some(permission) = state.permissions.remove(&id) else {
            return Ok(false);
        };
        state.tokens.remove(&permission.token);
        state.group_permissions.remove_right(id);
        state.bundle_permissions.remove_right(id);
        info!(permission_id = %id, token = %permission.token, "Permission deleted");
        Ok(true)
    }

    // -- Bundles --

    /// Inserts a permission bundle.
    pub fn create_bundle(&self, input: CreatePermissionBundle) -> AppResult<PermissionBundle> {
        let bundle = input.into_bundle();
        self.write()?.bundles.insert(bundle.id, bundle.clone());
        debug!(bundle_id = %bundle.id, label = %bundle.label, "Permission bundle created");
        Ok(bundle)
    }

    /// Looks up a bundle by id.
    pub fn bundle(&self, id: PermissionBundleId) -> AppResult<PermissionBundle> {
        self.read()?
            .bundles
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Permission bundle {id} not found")))
    }

    /// Every bundle in the store.
    pub fn bundles(&self) -> AppResult<Vec<PermissionBundle>> {
        Ok(self.read()?.bundles.values().cloned().collect())
    }

    /// Deletes a bundle and its edges. Its permissions remain.
    pub fn delete_bundle(&self, id: PermissionBundleId) -> AppResult<bool> {
        let mut state = self.write()?;
        if state.bundles.remove(&id).is_none() {
            return Ok(false);
        }
        state.bundle_permissions.remove_left(id);
        state.group_bundles.remove_right(id);
        info!(bundle_id = %id, "Permission bundle deleted");
        Ok(true)
    }

    /// Replaces the bundle's permissions with exactly `permissions`.
    pub fn set_bundle_permissions(
        &self,
        bundle: PermissionBundleId,
        permissions: &[PermissionId],
    ) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_bundle(bundle)?;
        for permission in permissions {
            state.require_permission(*permission)?;
        }
        state
            .bundle_permissions
            .replace_left(bundle, permissions.iter().copied());
        Ok(())
    }

    /// Adds one permission to a bundle.
    pub fn link_bundle_permission(
        &self,
        bundle: PermissionBundleId,
        permission: PermissionId,
    ) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_bundle(bundle)?;
        state.require_permission(permission)?;
        state.bundle_permissions.link(bundle, permission);
        Ok(())
    }

    /// Removes one permission from a bundle. Returns whether the edge existed.
    pub fn unlink_bundle_permission(
        &self,
        bundle: PermissionBundleId,
        permission: PermissionId,
    ) -> AppResult<bool> {
        Ok(self.write()?.bundle_permissions.unlink(bundle, permission))
    }

    // -- Groups --

    /// Inserts a user group.
    pub fn create_group(&self, input: CreateUserGroup) -> AppResult<UserGroup> {
        let group = input.into_group();
        self.write()?.groups.insert(group.id, group.clone());
        debug!(group_id = %group.id, label = %group.label, "User group created");
        Ok(group)
    }

    /// Looks up a group by id.
    pub fn group(&self, id: UserGroupId) -> AppResult<UserGroup> {
        self.read()?
            .groups
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("User group {id} not found")))
    }

    /// Every group in the store.
    pub fn groups(&self) -> AppResult<Vec<UserGroup>> {
        Ok(self.read()?.groups.values().cloned().collect())
    }

    /// Deletes a group and its edges, including subject memberships.
    pub fn delete_group(&self, id: UserGroupId) -> AppResult<bool> {
        let mut state = self.write()?;
        if state.groups.remove(&id).is_none() {
            return Ok(false);
        }
        state.group_permissions.remove_left(id);
        state.group_bundles.remove_left(id);
        state.subject_groups.remove_right(id);
        info!(group_id = %id, "User group deleted");
        Ok(true)
    }

    /// Replaces the group's direct permissions with exactly `permissions`.
    pub fn set_group_permissions(
        &self,
        group: UserGroupId,
        permissions: &[PermissionId],
    ) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_group(group)?;
        for permission in permissions {
            state.require_permission(*permission)?;
        }
        state
            .group_permissions
            .replace_left(group, permissions.iter().copied());
        Ok(())
    }

    /// Replaces the group's bundles with exactly `bundles`.
    pub fn set_group_bundles(
        &self,
        group: UserGroupId,
        bundles: &[PermissionBundleId],
    ) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_group(group)?;
        for bundle in bundles {
            state.require_bundle(*bundle)?;
        }
        state
            .group_bundles
            .replace_left(group, bundles.iter().copied());
        Ok(())
    }

    /// Grants one permission directly to a group.
    pub fn link_group_permission(
        &self,
        group: UserGroupId,
        permission: PermissionId,
    ) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_group(group)?;
        state.require_permission(permission)?;
        state.group_permissions.link(group, permission);
        Ok(())
    }

    /// Revokes one direct permission from a group.
    pub fn unlink_group_permission(
        &self,
        group: UserGroupId,
        permission: PermissionId,
    ) -> AppResult<bool> {
        Ok(self.write()?.group_permissions.unlink(group, permission))
    }

    /// Attaches a bundle to a group.
    pub fn link_group_bundle(&self, group: UserGroupId, bundle: PermissionBundleId) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_group(group)?;
        state.require_bundle(bundle)?;
        state.group_bundles.link(group, bundle);
        Ok(())
    }

    /// Detaches a bundle from a group.
    pub fn unlink_group_bundle(
        &self,
        group: UserGroupId,
        bundle: PermissionBundleId,
    ) -> AppResult<bool> {
        Ok(self.write()?.group_bundles.unlink(group, bundle))
    }

    // -- Subjects --

    /// Inserts a subject with no memberships.
    pub fn create_subject(&self, input: CreateSubject) -> AppResult<Subject> {
        let subject = input.into_subject();
        self.write()?.subjects.insert(subject.id, subject.clone());
        debug!(subject_id = %subject.id, "Subject created");
        Ok(subject)
    }

    /// Loads a subject with its current memberships filled in.
    pub fn subject(&self, id: SubjectId) -> AppResult<Subject> {
        let state = self.read()?;
        let mut subject = state
            .subjects
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Subject {id} not found")))?;
        subject.user_groups = state.subject_groups.rights_of(id);
        Ok(subject)
    }

    /// A live handle whose membership is read from the store on every call.
    pub fn handle(&self, id: SubjectId) -> SubjectHandle<'_> {
        SubjectHandle { store: self, id }
    }

    /// Deletes a subject and its memberships. Groups remain.
    pub fn delete_subject(&self, id: SubjectId) -> AppResult<bool> {
        let mut state = self.write()?;
        if state.subjects.remove(&id).is_none() {
            return Ok(false);
        }
        state.subject_groups.remove_left(id);
        info!(subject_id = %id, "Subject deleted");
        Ok(true)
    }

    /// Replaces the subject's memberships with exactly `groups`.
    pub fn set_subject_groups(&self, subject: SubjectId, groups: &[UserGroupId]) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_subject(subject)?;
        for group in groups {
            state.require_group(*group)?;
        }
        state
            .subject_groups
            .replace_left(subject, groups.iter().copied());
        Ok(())
    }

    /// Adds a subject to a group.
    pub fn add_subject_to_group(&self, subject: SubjectId, group: UserGroupId) -> AppResult<()> {
        let mut state = self.write()?;
        state.require_subject(subject)?;
        state.require_group(group)?;
        state.subject_groups.link(subject, group);
        Ok(())
    }

    /// Removes a subject from a group.
    pub fn remove_subject_from_group(
        &self,
        subject: SubjectId,
        group: UserGroupId,
    ) -> AppResult<bool> {
        Ok(self.write()?.subject_groups.unlink(subject, group))
    }

    /// Subjects that belong to a group.
    pub fn group_members(&self, group: UserGroupId) -> AppResult<Vec<SubjectId>> {
        let state = self.read()?;
        state.require_group(group)?;
        Ok(state.subject_groups.lefts_of(group))
    }

    /// Loads a subject and every edge below its groups under one read lock.
    ///
    /// Resolving against the returned snapshot sees a single state of the
    /// store even while other threads mutate it.
    pub fn snapshot_for(&self, id: SubjectId) -> AppResult<(Subject, GraphSnapshot)> {
        let state = self.read()?;
        let mut subject = state
            .subjects
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Subject {id} not found")))?;
        subject.user_groups = state.subject_groups.rights_of(id);

        let mut snapshot = GraphSnapshot::new();
        for group in &subject.user_groups {
            for permission in state.permissions_for(state.group_permissions.rights_of(*group)) {
                snapshot.add_group_permission(*group, permission);
            }
            for bundle in state.group_bundles.rights_of(*group) {
                snapshot.add_group_bundle(*group, bundle);
                for permission in state.permissions_for(state.bundle_permissions.rights_of(bundle)) {
                    snapshot.add_bundle_permission(bundle, permission);
                }
            }
        }
        debug!(subject_id = %id, groups = subject.user_groups.len(), "Captured subject snapshot");
        Ok((subject, snapshot))
    }

    /// Total number of association edges across all link tables.
    pub fn edge_count(&self) -> AppResult<usize> {
        let state = self.read()?;
        Ok(state.group_permissions.len()
            + state.group_bundles.len()
            + state.bundle_permissions.len()
            + state.subject_groups.len())
    }
}

/// Groups and bundles that no longer exist have no edges, so they resolve
/// to nothing rather than failing. A subject loaded before one of its
/// groups was deleted still resolves.
impl PermissionGraph for MemoryEntityStore {
    fn group_permissions(&self, group: UserGroupId) -> AppResult<Vec<Permission>> {
        let state = self.read()?;
        Ok(state.permissions_for(state.group_permissions.rights_of(group)))
    }

    fn group_bundles(&self, group: UserGroupId) -> AppResult<Vec<PermissionBundleId>> {
        Ok(self.read()?.group_bundles.rights_of(group))
    }

    fn bundle_permissions(&self, bundle: PermissionBundleId) -> AppResult<Vec<Permission>> {
        let state = self.read()?;
        Ok(state.permissions_for(state.bundle_permissions.rights_of(bundle)))
    }
}

/// A subject reference that reads membership live from a
/// [`MemoryEntityStore`].
///
/// Once the subject row is deleted every call fails with `NotFound`.
#[derive(Debug, Clone, Copy)]
pub struct SubjectHandle<'a> {
    store: &'a MemoryEntityStore,
    id: SubjectId,
}

impl SubjectHandle<'_> {
    /// Loads the current row.
    pub fn load(&self) -> AppResult<Subject> {
        self.store.subject(self.id)
    }
}

impl AuthorizationSubject for SubjectHandle<'_> {
    fn subject_id(&self) -> SubjectId {
        self.id
    }

    fn user_group_ids(&self) -> AppResult<Vec<UserGroupId>> {
        let state = self.store.read()?;
        state.require_subject(self.id)?;
        Ok(state.subject_groups.rights_of(self.id))
    }
}
