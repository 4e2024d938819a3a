//! Content-Security-Policy building blocks for `phwu.dev`
//!
//! This crate holds the framework-free half of the security header
//! middleware: per-request nonces drawn from an injectable random source,
//! and the two directive sets the site can be deployed with. The HTTP side
//! (axum middleware, request context) lives in the `phwu-site` service.

mod nonce;
pub use nonce::{
    probe_entropy, CspNonce, EntropyError, NonceSource, ThreadRngSource, NONCE_LEN,
};

mod policy;
pub use policy::{build_csp_header, CspVariant};
