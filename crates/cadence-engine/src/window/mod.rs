//! Windowed host.
//!
//! Owns the `winit` event loop on the calling thread and runs the
//! application loop beside it.

mod runtime;

pub use runtime::Runtime;
