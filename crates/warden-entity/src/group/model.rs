//! User group entity model.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::UserGroupId;

/// A labelled grouping of subjects, typically a business role such as
/// "auditors" or "editors".
///
/// A group grants permissions directly and/or through permission bundles.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserGroup {
    /// Unique group identifier.
    pub id: UserGroupId,
    /// Display label.
    pub label: String,
}

impl PartialEq for UserGroup {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserGroup {}

impl Hash for UserGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Data required to create a new user group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserGroup {
    /// Display label.
    pub label: String,
}

impl CreateUserGroup {
    /// Builds the entity under a fresh id.
    pub fn into_group(self) -> UserGroup {
        UserGroup {
            id: UserGroupId::new(),
            label: self.label,
        }
    }
}
