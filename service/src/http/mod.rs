//! HTTP middleware and request-scoped state.
//!
//! The security header middleware is the outermost application layer: it
//! enforces the canonical host, mints the per-request CSP nonce, and stamps
//! the security headers on whatever the inner layers return.

pub mod canonical;
pub mod context;
mod host;
pub mod origin;
pub mod security;

pub use canonical::CanonicalHost;
pub use context::RequestContext;
pub use origin::origin_check_middleware;
pub use security::{security_headers_middleware, SecurityHeaders, SecurityHeadersError};
