//! # warden-entity
//!
//! Entity models for the Warden authorization graph. Every struct in this
//! crate represents a row of one of the store's collections; database
//! entities additionally derive `sqlx::FromRow`.
//!
//! The graph has exactly three levels:
//!
//! ```text
//! Subject ──▶ UserGroup ──▶ Permission
//!                  │
//!                  └──────▶ PermissionBundle ──▶ Permission
//! ```
//!
//! [`graph`] defines the read-side capabilities the resolver consumes.

pub mod graph;
pub mod group;
pub mod permission;
pub mod subject;

pub use graph::{AuthorizationSubject, PermissionGraph};
pub use group::UserGroup;
pub use permission::{Permission, PermissionBundle};
pub use subject::Subject;
