//! Permission entity model.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::error::AppError;
use warden_core::types::PermissionId;

/// An authorization boundary the application checks by `token`.
///
/// The token is how source code refers to the permission; the
/// description is what humans granting it read. Two permissions are the
/// same permission iff their ids match.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: PermissionId,
    /// Globally unique token, e.g. `"report:view"`.
    pub token: String,
    /// Human-oriented description.
    pub description: String,
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Permission {}

impl Hash for Permission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Data required to create a new permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    /// Desired token. Must be non-empty and unused.
    pub token: String,
    /// Description shown to whoever grants the permission.
    pub description: String,
}

impl CreatePermission {
    /// Shorthand for a permission whose description is given separately.
    pub fn new(token: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            description: description.into(),
        }
    }

    /// Rejects input no store should accept.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.token.trim().is_empty() {
            return Err(AppError::validation("Permission token must not be empty"));
        }
        Ok(())
    }

    /// Builds the entity under a fresh id.
    pub fn into_permission(self) -> Permission {
        Permission {
            id: PermissionId::new(),
            token: self.token,
            description: self.description,
        }
    }
}
