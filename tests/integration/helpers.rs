//! Shared test helpers for integration tests.

use std::sync::Arc;

use warden::database::MemoryEntityStore;
use warden::entity::group::{CreateUserGroup, UserGroup};
use warden::entity::permission::{CreatePermission, CreatePermissionBundle, PermissionBundle};
use warden::entity::subject::{CreateSubject, Subject};
use warden::entity::Permission;

/// The reference graph used across the permission tests.
///
/// ```text
/// B1 = {p2}            G1 = perms {p1, p3}
/// B2 = {p2, p3}        G2 = bundles {B1}
///                      G3 = perms {p1, p2}, bundles {B1, B2}
/// ```
pub struct Scenario {
    pub store: Arc<MemoryEntityStore>,
    pub p1: Permission,
    pub p2: Permission,
    pub p3: Permission,
    pub b1: PermissionBundle,
    pub b2: PermissionBundle,
    pub g1: UserGroup,
    pub g2: UserGroup,
    pub g3: UserGroup,
}

impl Scenario {
    /// Build the reference graph in a fresh in-memory store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryEntityStore::new());

        let mut created = store
            .create_permissions([
                CreatePermission::new("p1", "first"),
                CreatePermission::new("p2", "second"),
                CreatePermission::new("p3", "third"),
            ])
            .expect("Failed to create permissions")
            .into_iter();
        let (p1, p2, p3) = (
            created.next().expect("p1"),
            created.next().expect("p2"),
            created.next().expect("p3"),
        );

        let b1 = bundle(&store, "B1");
        let b2 = bundle(&store, "B2");
        store
            .set_bundle_permissions(b1.id, &[p2.id])
            .expect("Failed to fill B1");
        store
            .set_bundle_permissions(b2.id, &[p2.id, p3.id])
            .expect("Failed to fill B2");

        let g1 = group(&store, "G1");
        let g2 = group(&store, "G2");
        let g3 = group(&store, "G3");
        store
            .set_group_permissions(g1.id, &[p1.id, p3.id])
            .expect("Failed to fill G1");
        store
            .set_group_bundles(g2.id, &[b1.id])
            .expect("Failed to fill G2");
        store
            .set_group_permissions(g3.id, &[p1.id, p2.id])
            .expect("Failed to fill G3");
        store
            .set_group_bundles(g3.id, &[b1.id, b2.id])
            .expect("Failed to fill G3");

        Self {
            store,
            p1,
            p2,
            p3,
            b1,
            b2,
            g1,
            g2,
            g3,
        }
    }

    /// Create a subject and place it in `groups`.
    pub fn subject(&self, name: &str, groups: &[&UserGroup]) -> Subject {
        let subject = self
            .store
            .create_subject(CreateSubject {
                name: name.to_string(),
            })
            .expect("Failed to create subject");
        let ids: Vec<_> = groups.iter().map(|g| g.id).collect();
        self.store
            .set_subject_groups(subject.id, &ids)
            .expect("Failed to set memberships");
        self.store
            .subject(subject.id)
            .expect("Failed to reload subject")
    }
}

fn bundle(store: &MemoryEntityStore, label: &str) -> PermissionBundle {
    store
        .create_bundle(CreatePermissionBundle {
            label: label.to_string(),
        })
        .expect("Failed to create bundle")
}

fn group(store: &MemoryEntityStore, label: &str) -> UserGroup {
    store
        .create_group(CreateUserGroup {
            label: label.to_string(),
        })
        .expect("Failed to create group")
}

/// Sorted tokens of a permission set, for readable assertions.
pub fn tokens(set: &warden::PermissionSet) -> Vec<String> {
    let mut tokens: Vec<String> = set.tokens().into_iter().map(str::to_string).collect();
    tokens.sort();
    tokens
}
