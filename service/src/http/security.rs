//! Security headers middleware for HTTP responses.
//!
//! Every response that passes through gets a Content-Security-Policy built
//! around a fresh nonce, plus X-Frame-Options, X-Content-Type-Options,
//! Referrer-Policy and Permissions-Policy. Requests to an alias host are
//! redirected before any of that happens.

use std::{convert::Infallible, future::Future, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{
        header::{
            InvalidHeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
        HeaderMap, HeaderName, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use site_csp::{build_csp_header, CspNonce, CspVariant, NonceSource, NONCE_LEN};

use super::{canonical::CanonicalHost, context::RequestContext};
use crate::config::SecurityHeadersConfig;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Headers whose values never change between requests.
const STATIC_HEADERS: [(HeaderName, &str); 4] = [
    (X_FRAME_OPTIONS, "DENY"),
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (
        PERMISSIONS_POLICY,
        "geolocation=(), microphone=(), camera=()",
    ),
];

/// The configured policy cannot be sent as a header.
#[derive(Debug, thiserror::Error)]
pub enum SecurityHeadersError {
    #[error("Content-Security-Policy is not a valid header value: {0}")]
    InvalidPolicy(#[from] InvalidHeaderValue),
}

/// Immutable middleware state, built once at startup and shared by all
/// requests.
pub struct SecurityHeaders {
    variant: CspVariant,
    canonical_host: Option<CanonicalHost>,
    nonce_source: Arc<dyn NonceSource>,
}

impl SecurityHeaders {
    /// Build the middleware state.
    ///
    /// # Errors
    /// Returns `SecurityHeadersError` if `variant` renders to a string that
    /// is not a valid header value (e.g. a site origin with control
    /// characters).
    pub fn new(
        variant: CspVariant,
        canonical_host: Option<CanonicalHost>,
        nonce_source: Arc<dyn NonceSource>,
    ) -> Result<Self, SecurityHeadersError> {
        // Nonces are base64, so one sample render covers every request
        let sample = CspNonce::from_bytes(&[0u8; NONCE_LEN]);
        HeaderValue::from_str(&build_csp_header(&variant, sample.as_str()))?;

        Ok(Self {
            variant,
            canonical_host,
            nonce_source,
        })
    }

    /// Build the middleware state from configuration.
    ///
    /// # Errors
    /// See [`SecurityHeaders::new`].
    pub fn from_config(
        config: &SecurityHeadersConfig,
        nonce_source: Arc<dyn NonceSource>,
    ) -> Result<Self, SecurityHeadersError> {
        let canonical_host = config.enforce_canonical_host.then(|| {
            CanonicalHost::new(config.canonical_host.clone(), config.host_aliases.clone())
        });
        Self::new(config.csp_variant(), canonical_host, nonce_source)
    }

    #[must_use]
    pub const fn variant(&self) -> &CspVariant {
        &self.variant
    }

    /// Run one request through the middleware.
    ///
    /// 1. Alias host: return a 301 to the canonical host, `next` is not called.
    /// 2. Mint a nonce and attach a [`RequestContext`] to the request.
    /// 3. Await `next`. An error is returned as-is with no headers touched.
    /// 4. Overwrite the security headers on the response.
    ///
    /// # Errors
    /// Only errors produced by `next`.
    pub async fn handle<F, Fut, E>(&self, mut request: Request, next: F) -> Result<Response, E>
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Result<Response, E>>,
    {
        if let Some(redirect) = self
            .canonical_host
            .as_ref()
            .and_then(|canonical| canonical.redirect_for(&request))
        {
            return Ok(redirect);
        }

        let nonce = CspNonce::generate(self.nonce_source.as_ref());
        request
            .extensions_mut()
            .insert(RequestContext::new(nonce.clone()));

        let mut response = next(request).await?;
        self.apply_headers(response.headers_mut(), &nonce);
        Ok(response)
    }

    /// Insert the CSP for `nonce` and the static headers, replacing any
    /// values already present.
    pub fn apply_headers(&self, headers: &mut HeaderMap, nonce: &CspNonce) {
        match HeaderValue::from_str(&build_csp_header(&self.variant, nonce.as_str())) {
            Ok(value) => {
                headers.insert(CONTENT_SECURITY_POLICY, value);
            }
            // Unreachable after the check in `new`
            Err(err) => tracing::error!(error = %err, "failed to encode Content-Security-Policy"),
        }

        for (name, value) in STATIC_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
}

/// Axum adapter for [`SecurityHeaders::handle`].
///
/// Install it outside every other application layer so that all routes,
/// including the fallback, are covered.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use axum::{middleware, Router};
/// use phwu_site::http::{security_headers_middleware, SecurityHeaders};
/// use site_csp::{CspVariant, ThreadRngSource};
///
/// let security = SecurityHeaders::new(CspVariant::Strict, None, Arc::new(ThreadRngSource))?;
///
/// let app = Router::new()
///     // ... routes ...
///     .layer(middleware::from_fn_with_state(Arc::new(security), security_headers_middleware));
/// ```
pub async fn security_headers_middleware(
    State(security): State<Arc<SecurityHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    security
        .handle(request, |request| async move {
            Ok::<_, Infallible>(next.run(request).await)
        })
        .await
        .unwrap_or_else(|never| match never {})
}
