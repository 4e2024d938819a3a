//! Deterministic nonce sources for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use site_csp::{NonceSource, NONCE_LEN};

/// Always returns the same bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNonceSource(pub [u8; NONCE_LEN]);

impl NonceSource for FixedNonceSource {
    fn random_bytes(&self) -> [u8; NONCE_LEN] {
        self.0
    }
}

/// Returns the call index (little-endian) in the first eight bytes, so each
/// call yields a distinct nonce, and counts how often it was asked.
#[derive(Debug, Default)]
pub struct CountingNonceSource {
    calls: AtomicU64,
}

impl CountingNonceSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nonces handed out so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NonceSource for CountingNonceSource {
    fn random_bytes(&self) -> [u8; NONCE_LEN] {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut bytes = [0u8; NONCE_LEN];
        bytes[..8].copy_from_slice(&call.to_le_bytes());
        bytes
    }
}
