//! Issuing and checking expiring tokens.

use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use warden_core::config::TokenConfig;
use warden_core::result::AppResult;
use warden_core::traits::{Clock, SystemClock};

use super::codec::TokenCodec;

/// Outcome of [`TokenManager::verify_token`].
///
/// | token   | `is_expired` | `payload`  |
/// |---------|--------------|------------|
/// | invalid | `false`      | `None`     |
/// | expired | `true`       | `None`     |
/// | valid   | `false`      | `Some(..)` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenVerification {
    /// The token was authentic but older than the allowed window.
    pub is_expired: bool,
    /// The payload of a valid token.
    pub payload: Option<Vec<u8>>,
}

impl TokenVerification {
    fn invalid() -> Self {
        Self {
            is_expired: false,
            payload: None,
        }
    }

    fn expired() -> Self {
        Self {
            is_expired: true,
            payload: None,
        }
    }

    fn valid(payload: Vec<u8>) -> Self {
        Self {
            is_expired: false,
            payload: Some(payload),
        }
    }

    /// Whether the token was authentic and fresh.
    pub fn is_valid(&self) -> bool {
        self.payload.is_some()
    }

    /// Splits into `(is_expired, payload)`.
    pub fn into_parts(self) -> (bool, Option<Vec<u8>>) {
        (self.is_expired, self.payload)
    }
}

/// Issues tokens stamped with the current time and verifies them against
/// a maximum age.
#[derive(Debug, Clone)]
pub struct TokenManager {
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    /// Creates a manager on the wall clock with the default salt.
    pub fn new(secret: impl AsRef<[u8]>) -> AppResult<Self> {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Creates a manager reading time from `clock`.
    pub fn with_clock(secret: impl AsRef<[u8]>, clock: Arc<dyn Clock>) -> AppResult<Self> {
        Ok(Self::with_codec(TokenCodec::new(secret)?, clock))
    }

    /// Creates a manager from the `token` configuration section.
    pub fn from_config(config: &TokenConfig) -> AppResult<Self> {
        config.validate()?;
        let codec = TokenCodec::with_salt(&config.secret_key, &config.salt)?;
        Ok(Self::with_codec(codec, Arc::new(SystemClock)))
    }

    /// Creates a manager from a prepared codec and clock.
    pub fn with_codec(codec: TokenCodec, clock: Arc<dyn Clock>) -> Self {
        Self { codec, clock }
    }

    /// Signs `payload` with the current time.
    pub fn generate_token(&self, payload: &[u8]) -> String {
        self.codec.encode(payload, self.clock.now().timestamp())
    }

    /// Checks authenticity first, then age.
    ///
    /// A token is expired only when strictly older than `expiration`; a
    /// token exactly `expiration` old is still valid. Invalid tokens are
    /// never reported as expired.
    pub fn verify_token(&self, token: &str, expiration: Duration) -> TokenVerification {
        let (issued_at, payload) = match self.codec.decode(token) {
            Ok(decoded) => decoded,
            Err(reason) => {
                debug!(reason = %reason, "Rejected token");
                return TokenVerification::invalid();
            }
        };

        let age = self.clock.now().timestamp().saturating_sub(issued_at);
        if age > expiration.num_seconds() {
            debug!(age, max_age = expiration.num_seconds(), "Token expired");
            return TokenVerification::expired();
        }
        TokenVerification::valid(payload)
    }
}
