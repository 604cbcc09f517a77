//! Token wire codec.
//!
//! A token is three unpadded URL-safe base64 segments joined by `.`:
//!
//! ```text
//! payload "." timestamp (i64, big-endian) "." HMAC-SHA256(key, payload "." timestamp)
//! ```
//!
//! The signing key is `HMAC-SHA256(secret, salt)`, so codecs built with
//! the same secret but different salts reject each other's tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use warden_core::config::token::DEFAULT_SALT;
use warden_core::error::AppError;
use warden_core::result::AppResult;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';

/// Why a token failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Wrong segment count or a segment that is not valid base64.
    #[error("malformed token")]
    Malformed,

    /// The signature does not match the signed segments.
    #[error("signature mismatch")]
    BadSignature,

    /// The timestamp segment is not an 8-byte integer.
    #[error("invalid timestamp")]
    BadTimestamp,
}

/// Signs and verifies tokens under a single derived key.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    /// Creates a codec with the default salt.
    ///
    /// Text and byte secrets are equivalent: `"k"` and `b"k"` sign
    /// identically.
    pub fn new(secret: impl AsRef<[u8]>) -> AppResult<Self> {
        Self::with_salt(secret, DEFAULT_SALT)
    }

    /// Creates a codec whose key is namespaced by `salt`.
    pub fn with_salt(secret: impl AsRef<[u8]>, salt: impl AsRef<[u8]>) -> AppResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AppError::configuration("Token secret key must not be empty"));
        }

        let mut derive = keyed(secret)?;
        derive.update(salt.as_ref());
        let derived = derive.finalize().into_bytes();

        Ok(Self {
            mac: keyed(&derived)?,
        })
    }

    /// Signs `payload` stamped with `timestamp` (seconds since the epoch).
    pub fn encode(&self, payload: &[u8], timestamp: i64) -> String {
        let mut token = URL_SAFE_NO_PAD.encode(payload);
        token.push(SEPARATOR);
        URL_SAFE_NO_PAD.encode_string(timestamp.to_be_bytes(), &mut token);

        let signature = self.sign(token.as_bytes());
        token.push(SEPARATOR);
        URL_SAFE_NO_PAD.encode_string(signature, &mut token);
        token
    }

    /// Verifies the signature and returns `(timestamp, payload)`.
    pub fn decode(&self, token: &str) -> Result<(i64, Vec<u8>), SignatureError> {
        let (signed, signature) = token
            .rsplit_once(SEPARATOR)
            .ok_or(SignatureError::Malformed)?;
        let (payload, timestamp) = signed
            .split_once(SEPARATOR)
            .ok_or(SignatureError::Malformed)?;
        if timestamp.contains(SEPARATOR) {
            return Err(SignatureError::Malformed);
        }

        let signature = decode_segment(signature)?;
        let payload = decode_segment(payload)?;
        let timestamp = decode_segment(timestamp)?;

        let mut mac = self.mac.clone();
        mac.update(signed.as_bytes());
        // Constant-time comparison.
        mac.verify_slice(&signature)
            .map_err(|_| SignatureError::BadSignature)?;

        let timestamp: [u8; 8] = timestamp
            .try_into()
            .map_err(|_| SignatureError::BadTimestamp)?;
        Ok((i64::from_be_bytes(timestamp), payload))
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

fn keyed(key: &[u8]) -> AppResult<HmacSha256> {
    HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::configuration(format!("Invalid token signing key: {e}")))
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, SignatureError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| SignatureError::Malformed)
}
