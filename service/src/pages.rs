//! The landing page. Everything else on the site is prebuilt and served from
//! `server.static_dir`.

use axum::response::Html;

use crate::http::RequestContext;

const NONCE_SLOT: &str = "{{nonce}}";
const NONCE_ATTRIBUTE: &str = r#" nonce="{{nonce}}""#;

// Grain texture: SVG fractal noise, slightly stronger on dark backgrounds.
const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>phwu.dev</title>
<style nonce="{{nonce}}">
:root { color-scheme: light dark; --grain-opacity: 0.05; }
@media (prefers-color-scheme: dark) { :root { --grain-opacity: 0.08; } }
body { margin: 0; min-height: 100vh; font-family: system-ui, sans-serif; }
.grain { position: fixed; inset: 0; pointer-events: none; opacity: var(--grain-opacity);
  background-image: url("data:image/svg+xml,%3Csvg viewBox='0 0 200 200' xmlns='http://www.w3.org/2000/svg'%3E%3Cfilter id='noise'%3E%3CfeTurbulence type='fractalNoise' baseFrequency='0.9' numOctaves='4' /%3E%3CfeColorMatrix type='saturate' values='0'/%3E%3C/filter%3E%3Crect width='100%25' height='100%25' filter='url(%23noise)'/%3E%3C/svg%3E"); }
</style>
</head>
<body>
<div class="grain" aria-hidden="true"></div>
<main><h1>phwu.dev</h1></main>
<script nonce="{{nonce}}">document.documentElement.dataset.js = "1";</script>
</body>
</html>
"#;

/// `GET /`
///
/// Without a request context (security headers disabled) the response has no
/// CSP, so the nonce attributes are left out.
pub async fn index(context: Option<RequestContext>) -> Html<String> {
    Html(match context {
        Some(context) => INDEX_TEMPLATE.replace(NONCE_SLOT, context.csp_nonce().as_str()),
        None => INDEX_TEMPLATE.replace(NONCE_ATTRIBUTE, ""),
    })
}
