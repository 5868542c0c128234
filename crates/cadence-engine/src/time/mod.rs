//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the loop.
//! Intended usage:
//! - one `FrameClock` per simulation loop; call `tick()` at the top of every frame
//!   to obtain the delta handed to the application
//! - one `FrameRate` per render surface; call `calculate()` once per rendered frame
//!   and paint `label()`

mod frame_clock;
mod frame_rate;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_rate::FrameRate;
