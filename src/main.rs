//! Replicache - a replicated in-memory key-value cache node
//!
//! Serves Get/Put/Remove with per-key TTL, and fans every client mutation
//! out to a fixed set of peer nodes.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replicache::{api::create_router, spawn_cleanup_task, AppState, Config};

/// How long the replication workers together may take to flush their queues on shutdown.
const REPLICATION_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build a runtime with a bounded worker pool
/// 4. Create the store and peer replicator
/// 5. Start the background expiry reaper
/// 6. Serve the RPC surface until SIGINT/SIGTERM, then drain
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replicache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, peers={:?}, max_entries={}, shards={}, cleanup_interval={}s, workers={}",
        config.server_port,
        config.peers,
        config.max_entries,
        config.shard_count,
        config.cleanup_interval,
        config.worker_threads
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).context("failed to initialize node")?;
    info!(
        "Cache store initialized with {} shards, {} peers",
        state.cache.shard_count(),
        state.replicator.peer_count()
    );

    let reaper = spawn_cleanup_task(
        state.cache.clone(),
        Duration::from_secs(config.cleanup_interval.max(1)),
    );

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Cache node listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .context("server error")?;

    reaper.abort();
    state.replicator.shutdown(REPLICATION_DRAIN_GRACE).await;
    info!("Cache node shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// Once received, the store stops accepting mutations while in-flight
/// requests drain.
async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    state.cache.close();
    warn!("Store closed to new mutations, draining in-flight requests");
}
