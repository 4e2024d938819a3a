use axum::http::{header::HOST, uri::Authority, Request};

/// The authority the client addressed: the URI's own authority (absolute-form
/// and HTTP/2 requests), else the `Host` header.
pub(crate) fn request_authority<B>(request: &Request<B>) -> Option<Authority> {
    if let Some(authority) = request.uri().authority() {
        return Some(authority.clone());
    }

    request.headers().get(HOST)?.to_str().ok()?.parse().ok()
}
