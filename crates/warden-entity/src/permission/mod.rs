//! Permission and permission bundle entities.

pub mod bundle;
pub mod model;

pub use bundle::{CreatePermissionBundle, PermissionBundle};
pub use model::{CreatePermission, Permission};
