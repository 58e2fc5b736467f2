//! Heart Heist server entry point.
//!
//! Opens the scene storage, writes any missing default stage templates,
//! resolves the backdrop image, then starts the Axum HTTP server with
//! graceful shutdown. A background session sweeper runs alongside the server
//! and is cancelled on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use heartheist_core::render::Renderer;
use heartheist_core::scenes::SceneLibrary;
use heartheist_storage::{FsBackend, MemoryBackend, StorageBackend};

use heartheist_server::background;
use heartheist_server::config::{ServerConfig, StorageBackendType};
use heartheist_server::routes;
use heartheist_server::sessions::SessionStore;
use heartheist_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "Heart Heist starting");

    let state = build_app_state(&config).await?;

    // Shutdown signal channel.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn the idle session sweeper.
    let sweeper_handle = {
        let state = Arc::clone(&state);
        let mut rx = shutdown_rx.clone();
        let ttl = config.session_ttl;
        let interval = config.session_sweep_interval;
        tokio::spawn(async move {
            session_sweep_worker(state, &mut rx, ttl, interval).await;
        })
    };

    let app = routes::build_router(Arc::clone(&state), config.max_upload_bytes);

    // Bind and serve.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Heart Heist listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    info!("waiting for background workers to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), sweeper_handle).await;

    info!("Heart Heist stopped");
    Ok(())
}

/// Open storage, install default scenes and resolve the backdrop.
async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let storage: Arc<dyn StorageBackend> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory stage templates (edits will not persist)");
            Arc::new(MemoryBackend::new())
        }
        StorageBackendType::Filesystem { path } => {
            info!(path = %path.display(), "using stage template directory");
            Arc::new(FsBackend::open(path).context("failed to open stages directory")?)
        }
    };

    let scenes = SceneLibrary::new(storage);
    let created = scenes
        .ensure_defaults()
        .await
        .context("failed to install default stage templates")?;
    if created.is_empty() {
        info!("all stage templates present");
    } else {
        info!(created = ?created, "created missing stage templates");
    }

    let background =
        background::resolve(config.background_url.as_deref(), config.fetch_timeout).await;

    info!(max_sessions = config.max_sessions, "session store ready");
    Ok(Arc::new(AppState::with_sessions(
        Renderer::new(scenes),
        SessionStore::with_max_sessions(config.max_sessions),
        background,
    )))
}

/// Background worker that periodically drops idle visitor sessions.
async fn session_sweep_worker(
    state: Arc<AppState>,
    shutdown: &mut watch::Receiver<bool>,
    ttl: Duration,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);
    info!(
        ttl_secs = ttl.as_secs(),
        interval_secs = every.as_secs(),
        "session sweeper started"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = state.sessions.remove_idle(ttl).await;
                if removed > 0 {
                    let remaining = state.sessions.len().await;
                    info!(removed, remaining, "idle sessions swept");
                }
            }
            _ = shutdown.changed() => {
                info!("session sweeper shutting down");
                return;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
