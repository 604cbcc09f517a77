//! Closure of a subject's permissions over the authorization graph.
//!
//! A subject holds exactly the union of two paths through each of its
//! groups:
//!
//! 1. group → permission (direct grants)
//! 2. group → bundle → permission
//!
//! The graph has a fixed depth and no back edges, so no cycle handling
//! is needed.

use std::sync::Arc;

use tracing::debug;

use warden_core::result::AppResult;
use warden_core::types::UserGroupId;
use warden_entity::graph::{AuthorizationSubject, PermissionGraph};

use super::set::PermissionSet;

/// Computes permission sets from a [`PermissionGraph`]. Stateless.
#[derive(Debug)]
pub struct PermissionResolver<G> {
    graph: Arc<G>,
}

impl<G> Clone for PermissionResolver<G> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
        }
    }
}

impl<G: PermissionGraph> PermissionResolver<G> {
    /// Creates a resolver over `graph`.
    pub fn new(graph: Arc<G>) -> Self {
        Self { graph }
    }

    /// The graph this resolver reads.
    pub fn graph(&self) -> &Arc<G> {
        &self.graph
    }

    /// All permissions reachable from `subject`. A subject in no groups
    /// holds nothing.
    pub fn resolve(&self, subject: &dyn AuthorizationSubject) -> AppResult<PermissionSet> {
        let groups = subject.user_group_ids()?;
        let mut permissions = PermissionSet::new();
        for group in &groups {
            self.collect_group(*group, &mut permissions)?;
        }

        debug!(
            subject_id = %subject.subject_id(),
            groups = groups.len(),
            permissions = permissions.len(),
            "Resolved subject permissions"
        );
        Ok(permissions)
    }

    /// All permissions a single group grants, directly or through its
    /// bundles. Used to audit a group independently of any subject.
    pub fn resolve_group(&self, group: UserGroupId) -> AppResult<PermissionSet> {
        let mut permissions = PermissionSet::new();
        self.collect_group(group, &mut permissions)?;
        Ok(permissions)
    }

    fn collect_group(&self, group: UserGroupId, into: &mut PermissionSet) -> AppResult<()> {
        into.extend(self.graph.group_permissions(group)?);
        for bundle in self.graph.group_bundles(group)? {
            into.extend(self.graph.bundle_permissions(bundle)?);
        }
        Ok(())
    }
}
