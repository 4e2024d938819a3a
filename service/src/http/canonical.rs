//! Permanent redirects from alias hosts (e.g. `www.`) to the canonical host.

use axum::{
    http::{header::LOCATION, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use super::host::request_authority;

/// The canonical host and the aliases that redirect to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHost {
    canonical: String,
    aliases: Vec<String>,
}

impl CanonicalHost {
    #[must_use]
    pub fn new(canonical: impl Into<String>, aliases: Vec<String>) -> Self {
        Self {
            canonical: canonical.into(),
            aliases,
        }
    }

    /// Whether `host` (no port) is one of the configured aliases.
    #[must_use]
    pub fn is_alias(&self, host: &str) -> bool {
        self.aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(host))
    }

    /// `https://<canonical><path>[?<query>]` for the given request URI.
    /// An empty query is dropped along with its `?`.
    #[must_use]
    pub fn location(&self, uri: &Uri) -> String {
        let path = match uri.path() {
            "" => "/",
            path => path,
        };

        match uri.query().filter(|query| !query.is_empty()) {
            Some(query) => format!("https://{}{path}?{query}", self.canonical),
            None => format!("https://{}{path}", self.canonical),
        }
    }

    /// A `301 Moved Permanently` to the canonical host if the request was
    /// addressed to an alias, otherwise `None`.
    #[must_use]
    pub fn redirect_for<B>(&self, request: &Request<B>) -> Option<Response> {
        let authority = request_authority(request)?;
        if !self.is_alias(authority.host()) {
            return None;
        }

        let location = self.location(request.uri());
        match HeaderValue::try_from(location) {
            Ok(value) => Some((StatusCode::MOVED_PERMANENTLY, [(LOCATION, value)]).into_response()),
            Err(err) => {
                tracing::warn!(error = %err, "canonical redirect location is not a valid header value");
                None
            }
        }
    }
}
