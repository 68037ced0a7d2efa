//! Serve command - runs the catalog HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::api::{RouterOptions, create_router};
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::init_metrics;
use crate::infrastructure::rate_limiter::RateLimiter;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Bind address, overrides `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Port, overrides `server.port`
    #[arg(long)]
    pub port: Option<u16>,

    /// Development mode: debug logging and error details in responses
    #[arg(long)]
    pub dev: bool,
}

impl ServeArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.dev {
            config.server.diagnostics = true;
            config.logging.level = "debug".to_string();
        }
    }
}

/// Run the HTTP server until Ctrl+C or SIGTERM
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().unwrap_or_default();
    args.apply(&mut config);
    logging::init_logging(&config.logging);

    let state = crate::create_app_state_with_config(&config).await?;
    let store = state.catalog.store().clone();

    let static_dir = config.catalog.static_dir.clone();
    if !static_dir.join("index.html").is_file() {
        warn!(dir = %static_dir.display(), "Static UI not found, serving API only");
    }

    let metrics = init_metrics(&config.metrics).map(|m| (m, config.metrics.path.clone()));
    let rate_limiter = config.rate_limit.enabled.then(|| {
        info!(
            max_requests = config.rate_limit.max_requests,
            window_secs = config.rate_limit.window_secs,
            "API rate limiting enabled"
        );
        Arc::new(RateLimiter::from_config(&config.rate_limit))
    });

    let app = create_router(
        state,
        RouterOptions {
            static_dir: Some(static_dir),
            metrics,
            rate_limiter,
        },
    );

    let addr = build_socket_addr(&config)?;
    info!("Starting workflow catalog on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close workflow store");
    }
    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
