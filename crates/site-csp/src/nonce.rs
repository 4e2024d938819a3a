//! CSP nonces: 16 random bytes, base64-encoded once per request.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes behind every nonce (128 bits).
pub const NONCE_LEN: usize = 16;

/// A source of nonce entropy.
///
/// Production code uses [`ThreadRngSource`]. Tests substitute a
/// deterministic implementation to assert exact header output.
pub trait NonceSource: Send + Sync {
    /// Return `NONCE_LEN` fresh bytes. Called exactly once per request.
    fn random_bytes(&self) -> [u8; NONCE_LEN];
}

/// Draws from the thread-local CSPRNG, which is seeded from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl NonceSource for ThreadRngSource {
    fn random_bytes(&self) -> [u8; NONCE_LEN] {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }
}

/// The operating system's random source could not be read.
#[derive(Debug, thiserror::Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropyError(#[from] rand::Error);

/// Check once that the OS entropy source is readable.
///
/// `ThreadRngSource` panics if it cannot seed itself, so the binary calls
/// this before accepting traffic and treats failure as fatal.
///
/// # Errors
/// Returns `EntropyError` if the OS source refuses to produce bytes.
pub fn probe_entropy() -> Result<(), EntropyError> {
    let mut bytes = [0u8; NONCE_LEN];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(())
}

/// A base64-encoded (standard alphabet, padded) per-request nonce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CspNonce(String);

impl CspNonce {
    /// Draw a fresh nonce from `source`.
    #[must_use]
    pub fn generate(source: &dyn NonceSource) -> Self {
        Self::from_bytes(&source.random_bytes())
    }

    /// Encode raw bytes as a nonce.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; NONCE_LEN]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// The encoded value, as placed in `nonce="..."` attributes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The source expression form used inside directives: `'nonce-<value>'`.
    #[must_use]
    pub fn source_expression(&self) -> String {
        format!("'nonce-{}'", self.0)
    }
}

impl fmt::Display for CspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CspNonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
