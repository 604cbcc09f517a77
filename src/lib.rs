//! # Warden
//!
//! Resolves what a subject may do from the groups it belongs to, and
//! issues signed, expiring tokens for flows that leave the process
//! (password resets, e-mail confirmation links).
//!
//! ```text
//! Subject ─▶ UserGroup ─┬─▶ Permission
//!                       └─▶ PermissionBundle ─▶ Permission
//! ```
//!
//! This crate re-exports the workspace members and wires up logging.

pub mod telemetry;

pub use warden_auth as auth;
pub use warden_database as database;
pub use warden_entity as entity;

pub use warden_core::{config, error, traits, types};

pub use warden_auth::{
    Authorizer, PermissionCache, PermissionResolver, PermissionSet, SignatureError, TokenCodec,
    TokenManager, TokenVerification,
};
pub use warden_core::config::AppConfig;
pub use warden_core::{AppError, AppResult};
