//! Terminal rendering layer
//!
//! Strictly read-only over the simulation: the renderer consumes the
//! per-frame view and hands commands back to the scheduler. It never
//! mutates world state directly.

pub mod camera;
pub mod colors;
pub mod terminal;

pub use terminal::TerminalRenderer;
