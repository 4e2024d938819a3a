//! Rejects cross-site form submissions.
//!
//! State-changing requests that a plain HTML form could send (form-encoded,
//! multipart or text bodies, or no declared body type) must come from a page
//! on this host. Anything else gets a 403 problem document.

use axum::{
    extract::Request,
    http::{
        header::{CONTENT_TYPE, ORIGIN},
        HeaderValue, Method, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::host::request_authority;
use crate::problem::ProblemDetails;

const GUARDED_METHODS: [Method; 4] = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

const FORM_CONTENT_TYPES: [&str; 3] = [
    "application/x-www-form-urlencoded",
    "multipart/form-data",
    "text/plain",
];

/// Middleware that short-circuits cross-site form submissions with 403.
pub async fn origin_check_middleware(request: Request, next: Next) -> Response {
    if is_cross_site_form(&request) {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected cross-site form submission"
        );
        return ProblemDetails::cross_site_form(request.uri().path()).into_response();
    }

    next.run(request).await
}

fn is_cross_site_form<B>(request: &Request<B>) -> bool {
    if !GUARDED_METHODS.contains(request.method()) {
        return false;
    }

    let form_like = request
        .headers()
        .get(CONTENT_TYPE)
        .map_or(true, is_form_content_type);

    form_like && !is_same_origin(request)
}

/// Undecodable values are treated as form-like.
fn is_form_content_type(value: &HeaderValue) -> bool {
    let Ok(value) = value.to_str() else {
        return true;
    };
    let media_type = value.split(';').next().unwrap_or_default().trim();
    FORM_CONTENT_TYPES
        .iter()
        .any(|form| media_type.eq_ignore_ascii_case(form))
}

/// `Origin` names an http(s) page on the host this request was sent to.
/// A missing or opaque (`null`) origin is not same-origin.
fn is_same_origin<B>(request: &Request<B>) -> bool {
    let Some(origin) = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Uri>().ok())
    else {
        return false;
    };

    if !matches!(origin.scheme_str(), Some("http" | "https")) {
        return false;
    }

    match (origin.authority(), request_authority(request)) {
        (Some(origin), Some(target)) => origin.as_str().eq_ignore_ascii_case(target.as_str()),
        _ => false,
    }
}
