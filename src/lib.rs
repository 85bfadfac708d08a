//! Auto-composite engine for a display server's present subsystem.
//!
//! When a compositing manager delegates windows to the server via an
//! auto list, this crate intercepts their present requests, stages them
//! into target-side double buffers, composites the client forest in
//! dependency order at vblank time, and releases client buffers back
//! with idle notifications.
//!
//! The windowing hierarchy ([`tree::WindowTree`]), the display driver
//! ([`backend::Backend`]), and the surrounding present machinery
//! ([`core::PresentCore`]) are injected by the embedding server; the
//! engine owns only the composite graph, the staging buffers, and the
//! frame-classification logic.

pub mod backend;
pub mod buffer;
pub mod comp;
pub mod core;
pub mod rect;
pub mod request;
pub mod tree;
mod utils;

pub use crate::comp::{CompEngine, CompError};
