//! Server configuration for Heart Heist.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `HEARTHEIST_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::sessions::DEFAULT_MAX_SESSIONS;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8314;

/// Default upload ceiling for the details form (8 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Where stage templates are kept.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Remote image for the vault backdrop, fetched once at startup.
    pub background_url: Option<String>,
    /// Timeout for the background fetch.
    pub fetch_timeout: Duration,
    /// Idle time after which a visitor session is dropped.
    pub session_ttl: Duration,
    /// How often the session sweeper runs.
    pub session_sweep_interval: Duration,
    /// Request body limit for the details form.
    pub max_upload_bytes: usize,
    /// Most visitor sessions held at once.
    pub max_sessions: usize,
}

/// Supported storage backend types for stage templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (defaults only, edits are lost on restart).
    Memory,
    /// A directory of `<stage>.html` files.
    Filesystem { path: PathBuf },
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on, binds to `0.0.0.0`
    /// - `HEARTHEIST_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8314`)
    /// - `HEARTHEIST_STORAGE` — `fs` or `memory` (default: `fs`)
    /// - `HEARTHEIST_STAGES_DIR` — stage template directory (default: `./stages`)
    /// - `HEARTHEIST_LOG_LEVEL` — log filter (default: `info`)
    /// - `HEARTHEIST_BACKGROUND_URL` — backdrop image URL (optional)
    /// - `HEARTHEIST_FETCH_TIMEOUT_SECS` — backdrop fetch timeout (default: `5`)
    /// - `HEARTHEIST_SESSION_TTL_SECS` — idle session lifetime (default: `3600`)
    /// - `HEARTHEIST_SESSION_SWEEP_INTERVAL_SECS` — sweep period (default: `60`)
    /// - `HEARTHEIST_MAX_UPLOAD_BYTES` — form body limit (default: 8 MiB)
    /// - `HEARTHEIST_MAX_SESSIONS` — live session cap (default: `10000`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: HEARTHEIST_BIND_ADDR > PORT > default 127.0.0.1:8314
        let default_addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));
        let bind_addr = if let Some(addr) = lookup("HEARTHEIST_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port) = lookup("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(DEFAULT_PORT)))
        } else {
            default_addr
        };

        let stages_dir = lookup("HEARTHEIST_STAGES_DIR").unwrap_or_else(|| "./stages".to_owned());
        let storage_backend = match lookup("HEARTHEIST_STORAGE")
            .unwrap_or_else(|| "fs".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" | "mem" => StorageBackendType::Memory,
            _ => StorageBackendType::Filesystem {
                path: PathBuf::from(stages_dir),
            },
        };

        let log_level = lookup("HEARTHEIST_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let background_url = lookup("HEARTHEIST_BACKGROUND_URL").filter(|u| !u.trim().is_empty());

        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                lookup(key)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default),
            )
        };

        let max_upload_bytes = lookup("HEARTHEIST_MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let max_sessions = lookup("HEARTHEIST_MAX_SESSIONS")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SESSIONS)
            .max(1);

        Self {
            bind_addr,
            storage_backend,
            log_level,
            background_url,
            fetch_timeout: secs("HEARTHEIST_FETCH_TIMEOUT_SECS", 5),
            session_ttl: secs("HEARTHEIST_SESSION_TTL_SECS", 3600),
            session_sweep_interval: secs("HEARTHEIST_SESSION_SWEEP_INTERVAL_SECS", 60)
                .max(Duration::from_secs(1)),
            max_upload_bytes,
            max_sessions,
        }
    }
}
