//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The host event thread feeds an `InputQueue`; the simulation thread turns
//! the queued events into one `InputSnapshot` per frame through an
//! `InputAggregator`.

mod aggregator;
pub mod platform;
mod queue;
mod types;

pub use aggregator::{InputAggregator, InputSnapshot};
pub use queue::InputQueue;
pub use types::{Key, RawInputEvent};
