//! Signed token configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Secret material for the token signer.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret key used to derive the HMAC signing key. Required.
    pub secret_key: String,
    /// Namespace mixed into key derivation. Tokens signed under one salt
    /// do not verify under another.
    #[serde(default = "default_salt")]
    pub salt: String,
}

impl TokenConfig {
    /// Fails if no usable secret is configured.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.secret_key.is_empty() {
            return Err(AppError::configuration("token.secret_key must not be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret_key", &"[REDACTED]")
            .field("salt", &self.salt)
            .finish()
    }
}

/// Salt applied when none is configured.
pub const DEFAULT_SALT: &str = "warden.token";

fn default_salt() -> String {
    DEFAULT_SALT.to_string()
}
