//! Per-request state handed from the security header middleware to handlers.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use site_csp::CspNonce;

use crate::problem::ProblemDetails;

/// Request-scoped values created before the request is delegated.
///
/// Lives in the request's extensions, so it is dropped with the request and
/// never shared between requests. Handlers read it with the extractor:
///
/// ```ignore
/// async fn page(context: RequestContext) -> Html<String> {
///     Html(format!(r#"<script nonce="{}">...</script>"#, context.csp_nonce()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    csp_nonce: CspNonce,
}

impl RequestContext {
    #[must_use]
    pub const fn new(csp_nonce: CspNonce) -> Self {
        Self { csp_nonce }
    }

    /// Nonce every inline `<script>` and `<style>` in this response must carry.
    #[must_use]
    pub const fn csp_nonce(&self) -> &CspNonce {
        &self.csp_nonce
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ProblemDetails;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            tracing::error!(
                path = %parts.uri.path(),
                "request context missing - security headers middleware is not installed"
            );
            ProblemDetails::internal_error("request context unavailable")
        })
    }
}

impl<S> OptionalFromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned())
    }
}
