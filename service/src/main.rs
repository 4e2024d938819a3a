#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use phwu_site::{
    app::{build_app, site_routes},
    config::Config,
};
use site_csp::{probe_entropy, ThreadRngSource};
use tracing_subscriber::EnvFilter;

/// phwu.dev web server
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// YAML configuration file (SITE_* environment variables still override it)
    #[arg(long, default_value = "config.yaml")]
    config: String,
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Load and validate configuration first (fail-fast)
    let config = Config::load_from(&cli.config).map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.level)?)
        .init();

    // Init banner so container logs clearly show startup
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "phwu-site starting up"
    );

    // Nonces cannot be minted without it; refuse to serve
    probe_entropy()?;

    let security = &config.security_headers;
    if security.enabled {
        tracing::info!(
            csp_variant = ?security.csp_variant,
            enforce_canonical_host = security.enforce_canonical_host,
            canonical_host = %security.canonical_host,
            host_aliases = ?security.host_aliases,
            "Security headers enabled"
        );
    } else {
        tracing::warn!("Security headers disabled - responses will carry no CSP");
    }
    if !security.check_origin {
        tracing::warn!("Cross-site form submission check disabled");
    }

    let routes = site_routes(config.server.static_dir.as_deref());
    if let Some(dir) = &config.server.static_dir {
        tracing::info!(static_dir = %dir, "Serving static assets");
    }

    let app = build_app(routes, &config, Arc::new(ThreadRngSource))?;

    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
