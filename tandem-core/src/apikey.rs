//! API key generation and hashing.
//!
//! Keys are handed out once at registration and never stored: the hub keeps
//! only the SHA-256 hex digest and authenticates by hashing the presented
//! key and looking the digest up.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix identifying a live tandem key.
pub const KEY_PREFIX: &str = "tandem_live_";

/// Random bytes behind each key.
const KEY_BYTES: usize = 24;

/// Generate a fresh API key.
#[must_use]
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", KEY_PREFIX, URL_SAFE_NO_PAD.encode(bytes))
}

/// The stored digest for a key.
#[must_use]
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}
