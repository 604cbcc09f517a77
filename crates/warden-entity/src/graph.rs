//! Read-side capabilities of the authorization graph.
//!
//! The resolver never sees a concrete store or subject type; it works
//! against these two traits. Any user entity becomes resolvable by
//! implementing [`AuthorizationSubject`].

use std::sync::Arc;

use warden_core::result::AppResult;
use warden_core::types::{PermissionBundleId, SubjectId, UserGroupId};

use crate::permission::Permission;

/// Anything whose permissions can be resolved.
pub trait AuthorizationSubject {
    /// Stable identity, used as the memo key.
    fn subject_id(&self) -> SubjectId;

    /// The groups this subject belongs to.
    ///
    /// Handles backed by a live store return `NotFound` once the row is
    /// gone.
    fn user_group_ids(&self) -> AppResult<Vec<UserGroupId>>;
}

impl<S: AuthorizationSubject + ?Sized> AuthorizationSubject for &S {
    fn subject_id(&self) -> SubjectId {
        (**self).subject_id()
    }

    fn user_group_ids(&self) -> AppResult<Vec<UserGroupId>> {
        (**self).user_group_ids()
    }
}

/// The association edges below the subject level.
pub trait PermissionGraph: Send + Sync {
    /// Permissions linked directly to a group.
    fn group_permissions(&self, group: UserGroupId) -> AppResult<Vec<Permission>>;

    /// Bundles linked to a group.
    fn group_bundles(&self, group: UserGroupId) -> AppResult<Vec<PermissionBundleId>>;

    /// Permissions contained in a bundle.
    fn bundle_permissions(&self, bundle: PermissionBundleId) -> AppResult<Vec<Permission>>;
}

impl<G: PermissionGraph + ?Sized> PermissionGraph for Arc<G> {
    fn group_permissions(&self, group: UserGroupId) -> AppResult<Vec<Permission>> {
        (**self).group_permissions(group)
    }

    fn group_bundles(&self, group: UserGroupId) -> AppResult<Vec<PermissionBundleId>> {
        (**self).group_bundles(group)
    }

    fn bundle_permissions(&self, bundle: PermissionBundleId) -> AppResult<Vec<Permission>> {
        (**self).bundle_permissions(bundle)
    }
}
