//! Subject entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::result::AppResult;
use warden_core::types::{SubjectId, UserGroupId};

use crate::graph::AuthorizationSubject;

/// A subject whose permissions are resolved, usually an application user.
///
/// `user_groups` is the membership as it was when the value was loaded.
/// It is not a column; stores fill it from their membership edges.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: SubjectId,
    /// Display name.
    pub name: String,
    /// Groups the subject belongs to.
    #[sqlx(skip)]
    #[serde(default)]
    pub user_groups: Vec<UserGroupId>,
}

impl AuthorizationSubject for Subject {
    fn subject_id(&self) -> SubjectId {
        self.id
    }

    fn user_group_ids(&self) -> AppResult<Vec<UserGroupId>> {
        Ok(self.user_groups.clone())
    }
}

/// Data required to create a new subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubject {
    /// Display name.
    pub name: String,
}

impl CreateSubject {
    /// Builds the entity under a fresh id, with no memberships.
    pub fn into_subject(self) -> Subject {
        Subject {
            id: SubjectId::new(),
            name: self.name,
            user_groups: Vec::new(),
        }
    }
}
