//! # warden-auth
//!
//! Authorization primitives built on the Warden entity graph.
//!
//! ## Modules
//!
//! - `permission`: closure of a subject's permissions over the
//!   subject → group → {permission, bundle → permission} graph, a
//!   per-subject memo, and the `has_permissions` query API
//! - `token`: HMAC-signed, timestamped opaque tokens for out-of-band
//!   flows such as password-reset links

pub mod permission;
pub mod token;

pub use permission::{Authorizer, PermissionCache, PermissionResolver, PermissionSet};
pub use token::{SignatureError, TokenCodec, TokenManager, TokenVerification};
