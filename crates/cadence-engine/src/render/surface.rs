use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::time::FrameRate;

use super::canvas::Canvas;
use super::color::Color;
use super::font::Font;
use super::strategy::{BufferStrategy, BufferUnavailable};

/// Frame-rate label painted over every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RateOverlay {
    pub color: Color,
    /// Left edge of the label.
    pub x: i32,
    /// Baseline of the label.
    pub y: i32,
    pub font_size: f32,
}

impl Default for RateOverlay {
    fn default() -> Self {
        Self {
            color: Color::GREEN,
            x: 20,
            y: 20,
            font_size: 14.0,
        }
    }
}

impl RateOverlay {
    fn paint(&self, canvas: &mut Canvas, label: &str) {
        canvas.set_font_size(self.font_size);
        canvas.draw_text(label, self.x, self.y, self.color);
    }
}

/// Result of ending one draw attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// The swap went through; the frame is on screen.
    Presented,
    /// The draw was invalidated before the swap; draw again.
    Restored,
    /// The buffers were discarded after the swap; start over.
    Lost,
}

/// Diagnostics for one `present` call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PresentReport {
    pub presented: bool,
    /// Number of times the draw callback ran.
    pub draws: u32,
    pub restored: u32,
    pub lost: u32,
}

/// An acquired back buffer.
///
/// Derefs to the `Canvas` being drawn. Dropping it releases the buffer, so
/// drawing resources are returned on every exit path including `?`.
pub struct DrawFrame<'a, S: BufferStrategy> {
    strategy: &'a mut S,
    released: bool,
}

impl<'a, S: BufferStrategy> DrawFrame<'a, S> {
    fn acquire(strategy: &'a mut S, font: Option<Arc<Font>>) -> Result<Self, BufferUnavailable> {
        strategy.acquire()?;
        Ok(Self::acquired(strategy, font))
    }

    /// Wraps a strategy whose `acquire` already succeeded.
    fn acquired(strategy: &'a mut S, font: Option<Arc<Font>>) -> Self {
        strategy.back_buffer_mut().reset_graphics(font);
        Self {
            strategy,
            released: false,
        }
    }

    /// Releases the buffer and, unless the draw was invalidated, swaps it.
    pub fn end(mut self) -> Result<FrameOutcome> {
        self.release();

        if self.strategy.contents_restored() {
            return Ok(FrameOutcome::Restored);
        }

        self.strategy.show()?;

        if self.strategy.contents_lost() {
            Ok(FrameOutcome::Lost)
        } else {
            Ok(FrameOutcome::Presented)
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.strategy.dispose();
        }
    }
}

impl<S: BufferStrategy> Deref for DrawFrame<'_, S> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.strategy.back_buffer()
    }
}

impl<S: BufferStrategy> DerefMut for DrawFrame<'_, S> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.strategy.back_buffer_mut()
    }
}

impl<S: BufferStrategy> Drop for DrawFrame<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Double/multi-buffered drawable plus the frame-rate counter painted on it.
///
/// Confined to the simulation thread once the loop starts.
pub struct RenderSurface<S: BufferStrategy> {
    strategy: S,
    frame_rate: FrameRate,
    background: Color,
    overlay: Option<RateOverlay>,
    font: Option<Arc<Font>>,
    buffer_wait: Duration,
    stalled: bool,
}

impl<S: BufferStrategy> RenderSurface<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            frame_rate: FrameRate::new(),
            background: Color::BLACK,
            overlay: Some(RateOverlay::default()),
            font: None,
            buffer_wait: Duration::from_millis(5),
            stalled: false,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// `None` disables the frame-rate label.
    pub fn with_overlay(mut self, overlay: Option<RateOverlay>) -> Self {
        self.overlay = overlay;
        self
    }

    /// Font installed on every acquired canvas.
    pub fn with_font(mut self, font: Option<Arc<Font>>) -> Self {
        self.font = font;
        self
    }

    /// Pause between attempts while the host has no buffers.
    pub fn with_buffer_wait(mut self, wait: Duration) -> Self {
        self.buffer_wait = wait;
        self
    }

    /// Starts frame-rate measurement. Call once before the first frame.
    pub fn initialize(&mut self) {
        if self.overlay.is_some() && self.font.is_none() {
            log::warn!("no font available; the frame-rate label will not be drawn");
        }
        self.frame_rate.initialize();
    }

    pub fn size(&self) -> (u32, u32) {
        self.strategy.size()
    }

    pub fn frame_rate(&self) -> &FrameRate {
        &self.frame_rate
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Acquires a back buffer for a single draw attempt.
    pub fn begin_frame(&mut self) -> Result<DrawFrame<'_, S>, BufferUnavailable> {
        DrawFrame::acquire(&mut self.strategy, self.font.clone())
    }

    /// Ends a frame from `begin_frame`. Same as `DrawFrame::end`.
    pub fn end_frame(frame: DrawFrame<'_, S>) -> Result<FrameOutcome> {
        frame.end()
    }

    /// Draws and presents one frame, retrying until it reaches the screen.
    ///
    /// Counts the frame in the frame-rate label, then per attempt: clears to
    /// the background, runs `draw`, paints the label and ends the frame. A
    /// restored draw is redone against a fresh buffer; a lost swap repeats the
    /// whole cycle. While buffers are unavailable the strategy is waited on
    /// and `keep_waiting` is polled; once it returns `false` the frame is
    /// abandoned with `presented == false`.
    ///
    /// An error from `draw` is returned after the buffer has been released
    /// and nothing is swapped.
    pub fn present<K, D>(&mut self, mut keep_waiting: K, mut draw: D) -> Result<PresentReport>
    where
        K: FnMut() -> bool,
        D: FnMut(&mut Canvas) -> Result<()>,
    {
        self.frame_rate.calculate();
        let mut report = PresentReport::default();

        loop {
            if self.strategy.acquire().is_err() {
                if !self.stalled {
                    log::debug!("drawing buffers not realized; waiting");
                    self.stalled = true;
                }
                if !keep_waiting() {
                    return Ok(report);
                }
                self.strategy.wait_for_buffers(self.buffer_wait);
                continue;
            }

            if self.stalled {
                log::debug!("drawing buffers realized; resuming");
                self.stalled = false;
            }
            let mut frame = DrawFrame::acquired(&mut self.strategy, self.font.clone());

            frame.clear(self.background);
            report.draws += 1;
            draw(&mut *frame)?;

            if let Some(overlay) = &self.overlay {
                overlay.paint(&mut frame, self.frame_rate.label());
            }

            match frame.end()? {
                FrameOutcome::Presented => {
                    report.presented = true;
                    return Ok(report);
                }
                FrameOutcome::Restored => {
                    report.restored += 1;
                    log::debug!("buffer contents restored; redrawing");
                }
                FrameOutcome::Lost => {
                    report.lost += 1;
                    log::debug!("buffer contents lost; reacquiring");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBuffers;

    fn surface() -> (RenderSurface<HeadlessBuffers>, crate::render::HeadlessControl) {
        let buffers = HeadlessBuffers::new(16, 16, 2);
        let control = buffers.control();
        let mut surface = RenderSurface::new(buffers).with_overlay(None);
        surface.initialize();
        (surface, control)
    }

    #[test]
    fn clean_frame_draws_once_and_presents() {
        let (mut s, ctl) = surface();

        let report = s.present(|| true, |_| Ok(())).unwrap();

        assert_eq!(
            report,
            PresentReport { presented: true, draws: 1, restored: 0, lost: 0 }
        );
        assert_eq!(ctl.presented(), 1);
        assert_eq!(ctl.acquires(), ctl.disposes());
    }

    #[test]
    fn each_restore_costs_one_redraw() {
        let (mut s, ctl) = surface();
        ctl.restore_next(3);

        let mut draws = 0u8;
        let report = s
            .present(
                || true,
                |canvas| {
                    draws += 1;
                    canvas.fill_rect(0, 0, 1, 1, Color::rgb(draws, 0, 0));
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(report.draws, 4);
        assert_eq!(report.restored, 3);
        assert_eq!(ctl.shows(), 1);

        let shown = ctl.last_frame().unwrap();
        assert_eq!(shown.pixel(0, 0), Some(Color::rgb(4, 0, 0)));
    }

    #[test]
    fn lost_swaps_repeat_the_whole_cycle() {
        let (mut s, ctl) = surface();
        ctl.lose_next(2);

        let report = s.present(|| true, |_| Ok(())).unwrap();

        assert_eq!(report.draws, 3);
        assert_eq!(report.lost, 2);
        assert_eq!(ctl.shows(), 3);
        assert_eq!(ctl.presented(), 1);
        assert_eq!(ctl.acquires(), 3);
    }

    #[test]
    fn draw_error_still_releases_and_skips_the_swap() {
        let (mut s, ctl) = surface();

        let err = s
            .present(|| true, |_| Err(anyhow::anyhow!("boom")))
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(ctl.acquires(), 1);
        assert_eq!(ctl.disposes(), 1);
        assert_eq!(ctl.shows(), 0);
    }

    #[test]
    fn waits_for_buffers_then_draws() {
        let (s, ctl) = surface();
        let mut s = s.with_buffer_wait(Duration::from_millis(1));
        ctl.set_unrealized(true);

        let mut polls = 0;
        let report = s
            .present(
                || {
                    polls += 1;
                    if polls == 3 {
                        ctl.set_unrealized(false);
                    }
                    true
                },
                |_| Ok(()),
            )
            .unwrap();

        assert!(report.presented);
        assert_eq!(report.draws, 1);
        assert_eq!(polls, 3);
        assert_eq!(ctl.acquires(), 1);
        assert_eq!(ctl.disposes(), 1);
        assert_eq!(ctl.presented(), 1);
    }

    #[test]
    fn gives_up_when_told_to_stop_waiting() {
        let (mut s, ctl) = surface();
        ctl.set_unrealized(true);

        let report = s.present(|| false, |_| Ok(())).unwrap();

        assert!(!report.presented);
        assert_eq!(report.draws, 0);
        assert_eq!(ctl.acquires(), 0);
    }

    #[test]
    fn begin_and_end_frame_by_hand() {
        let (mut s, ctl) = surface();

        let mut frame = s.begin_frame().unwrap();
        frame.fill_rect(0, 0, 16, 16, Color::BLUE);
        assert_eq!(RenderSurface::end_frame(frame).unwrap(), FrameOutcome::Presented);

        assert_eq!(ctl.last_frame().unwrap().pixel(8, 8), Some(Color::BLUE));
    }

    #[test]
    fn dropped_frame_is_released_without_presenting() {
        let (mut s, ctl) = surface();

        drop(s.begin_frame().unwrap());

        assert_eq!(ctl.disposes(), 1);
        assert_eq!(ctl.shows(), 0);
    }

    #[test]
    fn background_is_cleared_every_attempt() {
        let (s, ctl) = surface();
        let mut s = s.with_background(Color::DARK_GRAY);

        s.present(|| true, |_| Ok(())).unwrap();

        assert_eq!(ctl.last_frame().unwrap().pixel(3, 3), Some(Color::DARK_GRAY));
    }

    #[test]
    fn each_present_counts_one_frame() {
        let (mut s, ctl) = surface();
        ctl.restore_next(2);

        s.present(|| true, |_| Ok(())).unwrap();
        s.present(|| true, |_| Ok(())).unwrap();

        assert_eq!(s.frame_rate().frame_count(), 2);
    }
}
