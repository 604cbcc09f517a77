//! Signed, timestamped opaque tokens.
//!
//! Tokens carry an arbitrary byte payload and the time they were issued,
//! authenticated with HMAC-SHA256. They are not encrypted: anyone holding
//! a token can read its payload.

pub mod codec;
pub mod manager;

pub use codec::{SignatureError, TokenCodec};
pub use manager::{TokenManager, TokenVerification};
