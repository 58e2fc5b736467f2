//! Shared application state for the Heart Heist server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use heartheist_core::render::Renderer;

use crate::sessions::SessionStore;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Stage template renderer over the scene library.
    pub renderer: Renderer,
    /// Live visitor sessions.
    pub sessions: SessionStore,
    /// Backdrop image URI, resolved once at startup.
    pub background: String,
}

impl AppState {
    #[must_use]
    pub fn new(renderer: Renderer, background: String) -> Self {
        Self::with_sessions(renderer, SessionStore::new(), background)
    }

    #[must_use]
    pub fn with_sessions(renderer: Renderer, sessions: SessionStore, background: String) -> Self {
        Self {
            renderer,
            sessions,
            background,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
