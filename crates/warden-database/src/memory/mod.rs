//! In-memory entity store.

mod link;
pub mod store;

pub use store::{MemoryEntityStore, SubjectHandle};
