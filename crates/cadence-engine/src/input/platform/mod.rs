//! Platform event translation.

mod winit;

pub use self::winit::{forward_window_event, map_key};
