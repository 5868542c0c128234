use std::fmt;
use std::time::Duration;

use anyhow::Result;

use super::canvas::Canvas;

/// The host has not realized its drawing buffers yet (window hidden,
/// minimized, or still being created). Recoverable: wait and retry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferUnavailable;

impl fmt::Display for BufferUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("drawing buffers are not realized")
    }
}

impl std::error::Error for BufferUnavailable {}

/// Multi-buffered drawable supplied by the host.
///
/// The presentation cycle driven by `RenderSurface` is:
///
/// 1. `acquire`, then draw into `back_buffer_mut`
/// 2. `dispose` (always, even when drawing failed)
/// 3. if `contents_restored`, the draw was invalidated: go back to 1
/// 4. `show` swaps the back buffer to the screen
/// 5. if `contents_lost`, the buffers were discarded: go back to 1
///
/// `contents_restored` and `contents_lost` report what happened during the
/// current attempt and are reset by the next `acquire`.
pub trait BufferStrategy: Send {
    /// Drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Prepares the back buffer for drawing.
    fn acquire(&mut self) -> Result<(), BufferUnavailable>;

    fn back_buffer(&self) -> &Canvas;

    fn back_buffer_mut(&mut self) -> &mut Canvas;

    /// Releases drawing resources for the current back buffer.
    fn dispose(&mut self);

    /// Requests presentation of the back buffer.
    fn show(&mut self) -> Result<()>;

    fn contents_restored(&mut self) -> bool;

    fn contents_lost(&mut self) -> bool;

    /// Blocks for up to `timeout` while buffers are unavailable.
    fn wait_for_buffers(&mut self, timeout: Duration) {
        std::thread::sleep(timeout);
    }
}
