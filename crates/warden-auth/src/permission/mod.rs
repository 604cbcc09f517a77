//! Permission resolution, caching, and queries.

pub mod authorizer;
pub mod cache;
pub mod resolver;
pub mod set;

pub use authorizer::Authorizer;
pub use cache::PermissionCache;
pub use resolver::PermissionResolver;
pub use set::PermissionSet;
