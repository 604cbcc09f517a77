//! PostgreSQL repositories for the authorization graph.
//!
//! Expected tables (created by the host application's migrations):
//!
//! | Table | Columns |
//! |---|---|
//! | `permissions` | `id UUID PK`, `token VARCHAR(255) UNIQUE NOT NULL`, `description TEXT NOT NULL` |
//! | `permission_bundles` | `id UUID PK`, `label TEXT NOT NULL` |
//! | `user_groups` | `id UUID PK`, `label TEXT NOT NULL` |
//! | `subjects` | `id UUID PK`, `name TEXT NOT NULL` |
//! | `user_group_permission_map` | `user_group_id`, `permission_id` |
//! | `user_group_bundle_map` | `user_group_id`, `permission_bundle_id` |
//! | `bundle_permission_map` | `permission_bundle_id`, `permission_id` |
//! | `subject_user_group_map` | `subject_id`, `user_group_id` |
//!
//! Every link table has a composite primary key and `ON DELETE CASCADE`
//! foreign keys on both columns.

pub mod graph;
pub mod permission;

pub use graph::GraphRepository;
pub use permission::PermissionRepository;
