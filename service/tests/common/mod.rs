//! Common test utilities for integration tests.
//!
//! - [`app_builder::TestAppBuilder`] - Build test Axum apps that mirror main.rs wiring
//!
//! # App Builder Usage
//!
//! ```ignore
//! use crate::common::app_builder::TestAppBuilder;
//!
//! #[tokio::test]
//! async fn test_with_app() {
//!     let (app, probe) = TestAppBuilder::new().with_probe().build();
//!     // Use app.oneshot(...) to send requests, probe.calls() to count
//!     // how often the downstream handler ran
//! }
//! ```

pub mod app_builder;
