//! Permission bundle entity model.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::PermissionBundleId;

/// A labelled grouping of permissions that relate to a common task or
/// component. Bundles only ever link to permissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PermissionBundle {
    /// Unique bundle identifier.
    pub id: PermissionBundleId,
    /// Display label.
    pub label: String,
}

impl PartialEq for PermissionBundle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PermissionBundle {}

impl Hash for PermissionBundle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Data required to create a new bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermissionBundle {
    /// Display label.
    pub label: String,
}

impl CreatePermissionBundle {
    /// Builds the entity under a fresh id.
    pub fn into_bundle(self) -> PermissionBundle {
        PermissionBundle {
            id: PermissionBundleId::new(),
            label: self.label,
        }
    }
}
