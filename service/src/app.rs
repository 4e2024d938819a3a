//! Router assembly shared by `main.rs` and the integration tests.

use std::sync::Arc;

use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
use site_csp::NonceSource;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::Config,
    http::{
        origin_check_middleware, security_headers_middleware, SecurityHeaders,
        SecurityHeadersError,
    },
    pages,
};

// Health check handler
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// The site's own routes: `/`, `/health`, and prebuilt assets from
/// `static_dir` for everything else.
pub fn site_routes(static_dir: Option<&str>) -> Router {
    let router = Router::new()
        .route("/", get(pages::index))
        .route("/health", get(health_check));

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Wrap `routes` in the application layers, innermost first:
/// 1. Cross-site form guard (if `check_origin`)
/// 2. Security headers (if `enabled`)
/// 3. Request tracing
///
/// # Errors
/// Returns `SecurityHeadersError` if the configured CSP cannot be encoded.
pub fn build_app(
    routes: Router,
    config: &Config,
    nonce_source: Arc<dyn NonceSource>,
) -> Result<Router, SecurityHeadersError> {
    let security = &config.security_headers;
    let mut app = routes;

    if security.check_origin {
        app = app.layer(middleware::from_fn(origin_check_middleware));
    }

    if security.enabled {
        let headers = Arc::new(SecurityHeaders::from_config(security, nonce_source)?);
        app = app.layer(middleware::from_fn_with_state(
            headers,
            security_headers_middleware,
        ));
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}
