//! GitHub webhook receiver binary.
//!
//! Serves every path with the webhook handler and logs `ping` and `push`
//! deliveries. Configuration comes from the environment (see `Config`).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ghwebhook::events::{PingEvent, PushEvent};
use ghwebhook::{Config, GithubMeta, HandlerTable, Receiver};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("receiver_starting");

    // Load configuration
    let config = Config::from_env();
    let trust = config.trust_configuration();
    info!(
        port = config.port,
        signature_verification = trust.signature_verification_enabled(),
        restrict_address = trust.restrict_address(),
        static_trusted_ranges = trust.static_trusted_ranges().len(),
        meta_url = %config.meta_url,
        "config_loaded"
    );

    let meta = GithubMeta::new(config.meta_url.clone(), config.meta_timeout())
        .context("Failed to create metadata client")?;

    let handlers = HandlerTable::new()
        .on(|ping: PingEvent| {
            info!(
                zen = ping.zen.as_deref().unwrap_or_default(),
                hook_id = ?ping.hook_id,
                "ping_received"
            );
        })
        .on(|push: PushEvent| {
            info!(
                repository = push.repository.as_ref().map(|r| r.full_name.as_str()).unwrap_or_default(),
                git_ref = %push.git_ref,
                commits = push.commits.len(),
                "push_received"
            );
        });

    let receiver = Receiver::new(trust, Arc::new(meta), handlers);

    let app = receiver.router().layer(TraceLayer::new_for_http());

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "receiver_listening");

    // Run server with graceful shutdown; the socket peer is needed for
    // address restriction.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // Let handlers finish the deliveries that were already acknowledged.
    receiver.shutdown().await;

    info!("receiver_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("receiver_shutting_down");
}
