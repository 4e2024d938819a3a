//! Test app builder that mirrors main.rs wiring with injectable deps.
//!
//! This module provides a [`TestAppBuilder`] that constructs the Axum router
//! through the same `site_routes` + `build_app` path as `main.rs`, but with a
//! deterministic nonce source and an optional probe route that counts how
//! often the downstream handler is reached.
//!
//! # Usage
//!
//! ```ignore
//! use crate::common::app_builder::TestAppBuilder;
//!
//! #[tokio::test]
//! async fn test_with_full_app() {
//!     let (app, probe) = TestAppBuilder::new()
//!         .with_fixed_nonce([0u8; 16])
//!         .with_probe()
//!         .build();
//!
//!     // Use app.oneshot(...) to send requests
//! }
//! ```

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{Request, State},
    routing::any,
    Router,
};
use phwu_site::{
    app::{build_app, site_routes},
    config::{Config, CspMode, SecurityHeadersConfig},
    http::RequestContext,
    testing::FixedNonceSource,
};
use site_csp::{NonceSource, ThreadRngSource, NONCE_LEN};

/// Path of the probe route.
pub const PROBE_PATH: &str = "/probe";

/// Directory with a couple of prebuilt assets.
pub const FIXTURE_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/public");

/// Downstream stand-in: counts calls and echoes the request's CSP nonce
/// (empty if there is no request context).
#[derive(Debug, Clone, Default)]
pub struct Probe {
    calls: Arc<AtomicUsize>,
}

impl Probe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn probe_handler(State(probe): State<Probe>, request: Request) -> String {
    probe.calls.fetch_add(1, Ordering::SeqCst);
    request
        .extensions()
        .get::<RequestContext>()
        .map(|context| context.csp_nonce().to_string())
        .unwrap_or_default()
}

/// Builder for test applications that mirrors main.rs wiring.
pub struct TestAppBuilder {
    config: Config,
    nonce_source: Arc<dyn NonceSource>,
    include_probe: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    /// Default configuration (strict CSP, www redirect, origin check) with
    /// the production random source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            nonce_source: Arc::new(ThreadRngSource),
            include_probe: false,
        }
    }

    // =========================================================================
    // Component Configuration
    // =========================================================================

    /// Mount the counting probe at [`PROBE_PATH`] for every method.
    #[must_use]
    pub fn with_probe(mut self) -> Self {
        self.include_probe = true;
        self
    }

    /// Use a nonce source that always returns `bytes`.
    #[must_use]
    pub fn with_fixed_nonce(mut self, bytes: [u8; NONCE_LEN]) -> Self {
        self.nonce_source = Arc::new(FixedNonceSource(bytes));
        self
    }

    /// Use a custom nonce source.
    #[must_use]
    pub fn with_nonce_source(mut self, source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = source;
        self
    }

    /// Replace the security headers configuration.
    #[must_use]
    pub fn with_security_headers(mut self, config: SecurityHeadersConfig) -> Self {
        self.config.security_headers = config;
        self
    }

    /// Switch to the permissive CSP variant for `site_origin`.
    #[must_use]
    pub fn with_permissive_csp(mut self, site_origin: &str) -> Self {
        self.config.security_headers.csp_variant = CspMode::Permissive;
        self.config.security_headers.site_origin = site_origin.to_string();
        self
    }

    /// Serve the fixture assets for unmatched paths.
    #[must_use]
    pub fn with_static_fixtures(mut self) -> Self {
        self.config.server.static_dir = Some(FIXTURE_STATIC_DIR.to_string());
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build the Axum router and the probe handle.
    ///
    /// # Panics
    /// If the configuration fails validation.
    #[must_use]
    pub fn build(self) -> (Router, Probe) {
        self.config.validate().expect("test config should be valid");

        let probe = Probe::default();
        let mut routes = site_routes(self.config.server.static_dir.as_deref());

        if self.include_probe {
            routes = routes.merge(
                Router::new()
                    .route(PROBE_PATH, any(probe_handler))
                    .with_state(probe.clone()),
            );
        }

        let app = build_app(routes, &self.config, self.nonce_source)
            .expect("security headers should build");

        (app, probe)
    }
}
