//! Content-Security-Policy directive sets.
//!
//! Both variants trust inline content only through the per-request nonce.
//! `script-src` also lists `'strict-dynamic' https: 'unsafe-inline'`:
//! CSP3 browsers ignore the last two once a nonce and `'strict-dynamic'`
//! are present, older ones fall back to them.

/// Which directive set the site is deployed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CspVariant {
    /// Default-deny. Every fetch directive is spelled out.
    Strict,
    /// Same-origin defaults, with the site's public origin listed next to
    /// `'self'` (for deployments behind a proxy or preview host).
    Permissive {
        /// Scheme and host, e.g. `https://phwu.dev`.
        site_origin: String,
    },
}

impl CspVariant {
    /// The ordered directives for this variant with `nonce` interpolated.
    #[must_use]
    pub fn directives(&self, nonce: &str) -> Vec<String> {
        let script_src =
            format!("script-src 'nonce-{nonce}' 'strict-dynamic' https: 'unsafe-inline'");

        match self {
            Self::Strict => vec![
                "default-src 'none'".to_string(),
                script_src,
                format!("style-src 'nonce-{nonce}' 'self'"),
                "img-src 'self' data: https:".to_string(),
                "font-src 'self' data:".to_string(),
                "connect-src 'self'".to_string(),
                "media-src 'self'".to_string(),
                "worker-src 'self'".to_string(),
                "frame-src 'none'".to_string(),
                "frame-ancestors 'none'".to_string(),
                "manifest-src 'self'".to_string(),
                "base-uri 'self'".to_string(),
                "form-action 'self'".to_string(),
                "object-src 'none'".to_string(),
            ],
            Self::Permissive { site_origin } => vec![
                format!("default-src 'self' {site_origin}"),
                script_src,
                format!("style-src 'nonce-{nonce}' 'self' {site_origin}"),
                format!("img-src 'self' {site_origin} data: https:"),
                format!("font-src 'self' {site_origin} data:"),
                format!("connect-src 'self' {site_origin}"),
                "frame-ancestors 'none'".to_string(),
                "base-uri 'self'".to_string(),
                "form-action 'self'".to_string(),
                "object-src 'none'".to_string(),
            ],
        }
    }
}

/// Build the `Content-Security-Policy` header value: directives joined by
/// `"; "` in order, no trailing separator.
#[must_use]
pub fn build_csp_header(variant: &CspVariant, nonce: &str) -> String {
    variant.directives(nonce).join("; ")
}
