use anyhow::Result;

use crate::input::InputSnapshot;
use crate::render::Canvas;

/// Control directive returned by the input phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    /// Ask the loop to shut down. The current frame still updates and renders.
    Exit,
}

/// Application contract driven by `ApplicationLoop`.
///
/// Every method runs on the simulation thread. Per frame the phases run in
/// order: `process_input`, `update_objects`, `render`. `initialize` runs once
/// before the first frame and `terminate` once after the last, including
/// when a phase returned an error.
///
/// The loop itself handles input aggregation, frame-rate measurement, the
/// background clear and the rate label; implementations only add their own
/// phase logic.
pub trait App: Send + 'static {
    /// Called once with the drawable size in pixels.
    fn initialize(&mut self, size: (u32, u32)) -> Result<()> {
        let _ = size;
        Ok(())
    }

    /// `dt` is the time since the previous frame began, in seconds.
    fn process_input(&mut self, input: &InputSnapshot, dt: f32) -> Result<AppControl> {
        let _ = (input, dt);
        Ok(AppControl::Continue)
    }

    fn update_objects(&mut self, dt: f32) -> Result<()> {
        let _ = dt;
        Ok(())
    }

    /// Draws the frame. May run more than once per frame when the host
    /// invalidates the buffers; each run must draw the complete frame.
    fn render(&mut self, canvas: &mut Canvas) -> Result<()>;

    fn terminate(&mut self) {}
}
