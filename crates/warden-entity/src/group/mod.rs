//! User group entities.

pub mod model;

pub use model::{CreateUserGroup, UserGroup};
