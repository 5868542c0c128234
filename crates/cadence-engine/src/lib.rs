//! Cadence engine crate.
//!
//! A fixed-order frame loop (`process_input -> update_objects -> render`) on
//! a dedicated simulation thread, fed by a thread-safe input queue and
//! presented through a multi-buffered drawable with a frame-rate label.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
