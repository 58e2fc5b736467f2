//! Core library for Heart Heist.
//!
//! Contains the escaping template renderer, the data-URI asset encoder, the
//! calendar invite builder, the stage sequencer, the scene library, the
//! session input model and the render pipeline that ties them together. This
//! crate depends on `heartheist-storage` for the storage backend trait and
//! knows nothing about HTTP.

pub mod asset;
pub mod calendar;
pub mod compat;
pub mod error;
pub mod render;
pub mod scenes;
pub mod session;
pub mod stage;
pub mod template;
