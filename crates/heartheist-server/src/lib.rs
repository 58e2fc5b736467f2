//! Heart Heist HTTP server.
//!
//! Wires the core renderer, the scene storage backend and the per-visitor
//! session store into an Axum router. The host page lives at `/s/{id}`; the
//! scene for the visitor's current stage is served at `/s/{id}/frame`.

pub mod background;
pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;
