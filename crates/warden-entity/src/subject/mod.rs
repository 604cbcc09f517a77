//! Subject entities.

pub mod model;

pub use model::{CreateSubject, Subject};
