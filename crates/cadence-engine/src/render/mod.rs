//! Rendering subsystem.
//!
//! Drawing happens on a CPU `Canvas` owned by a host-supplied
//! `BufferStrategy`. `RenderSurface` drives the acquire/draw/release/swap
//! cycle and retries it until the host confirms the frame was presented.
//!
//! Convention:
//! - integer pixel coordinates, top-left origin, +Y down
//! - text is positioned by its baseline

mod canvas;
mod color;
mod font;
mod headless;
mod strategy;
mod surface;

pub use canvas::Canvas;
pub use color::Color;
pub use font::{Font, FontLoadError, Glyph};
pub use headless::{HeadlessBuffers, HeadlessControl};
pub use strategy::{BufferStrategy, BufferUnavailable};
pub use surface::{DrawFrame, FrameOutcome, PresentReport, RateOverlay, RenderSurface};
