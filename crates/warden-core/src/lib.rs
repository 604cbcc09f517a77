//! # warden-core
//!
//! Core crate for Warden. Contains configuration schemas, typed
//! identifiers, the clock abstraction used for token timestamps,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
