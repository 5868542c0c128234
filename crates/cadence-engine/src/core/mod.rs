//! Simulation loop and the application contract it drives.
//!
//! The loop owns a dedicated thread; the platform thread talks to it only
//! through the `InputQueue` and the `CloseHandle`.

mod app;
mod app_loop;
mod config;
mod state;

pub use app::{App, AppControl};
pub use app_loop::{ApplicationLoop, CloseHandle};
pub use config::{LoopConfig, Timestep};
pub use state::{LoopState, LoopStateError};
