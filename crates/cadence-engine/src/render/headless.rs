use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;

use super::canvas::Canvas;
use super::color::Color;
use super::strategy::{BufferStrategy, BufferUnavailable};

/// In-memory multi-buffer strategy.
///
/// Stands in for a windowing system in tests and offscreen runs. Faults are
/// scripted through the cloneable [`HeadlessControl`]: buffers can be marked
/// unrealized, and upcoming draws/swaps can be invalidated ("restored") or
/// discarded ("lost").
#[derive(Debug)]
pub struct HeadlessBuffers {
    buffers: Vec<Canvas>,
    back: usize,
    restored: bool,
    lost: bool,
    control: HeadlessControl,
}

#[derive(Debug, Default)]
struct ControlState {
    unrealized: bool,
    pending_restores: u32,
    pending_losses: u32,
    acquires: u64,
    disposes: u64,
    shows: u64,
    presented: u64,
    last_frame: Option<Canvas>,
}

/// Fault-injection and inspection handle for a [`HeadlessBuffers`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessControl {
    state: Arc<Mutex<ControlState>>,
}

impl HeadlessBuffers {
    /// Creates `count` buffers (at least one) of `width` x `height` pixels.
    pub fn new(width: u32, height: u32, count: usize) -> Self {
        let count = count.max(1);
        Self {
            buffers: (0..count).map(|_| Canvas::new(width, height)).collect(),
            back: 0,
            restored: false,
            lost: false,
            control: HeadlessControl::default(),
        }
    }

    pub fn control(&self) -> HeadlessControl {
        self.control.clone()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }
}

impl BufferStrategy for HeadlessBuffers {
    fn size(&self) -> (u32, u32) {
        self.buffers[0].size()
    }

    fn acquire(&mut self) -> Result<(), BufferUnavailable> {
        let mut state = self.control.lock();
        if state.unrealized {
            return Err(BufferUnavailable);
        }
        state.acquires += 1;
        self.restored = false;
        self.lost = false;
        Ok(())
    }

    fn back_buffer(&self) -> &Canvas {
        &self.buffers[self.back]
    }

    fn back_buffer_mut(&mut self) -> &mut Canvas {
        &mut self.buffers[self.back]
    }

    fn dispose(&mut self) {
        let mut state = self.control.lock();
        state.disposes += 1;

        if state.pending_restores > 0 {
            state.pending_restores -= 1;
            self.restored = true;
            // Invalidated memory: whatever was drawn is gone.
            self.buffers[self.back].clear(Color::BLACK);
        }
    }

    fn show(&mut self) -> Result<()> {
        let mut state = self.control.lock();
        state.shows += 1;

        if state.pending_losses > 0 {
            state.pending_losses -= 1;
            self.lost = true;
            return Ok(());
        }

        state.presented += 1;
        state.last_frame = Some(self.buffers[self.back].clone());
        drop(state);

        self.back = (self.back + 1) % self.buffers.len();
        Ok(())
    }

    fn contents_restored(&mut self) -> bool {
        self.restored
    }

    fn contents_lost(&mut self) -> bool {
        self.lost
    }
}

impl HeadlessControl {
    /// While set, `acquire` fails with `BufferUnavailable`.
    pub fn set_unrealized(&self, unrealized: bool) {
        self.lock().unrealized = unrealized;
    }

    /// Invalidates the next `n` draws (reported through `contents_restored`).
    pub fn restore_next(&self, n: u32) {
        self.lock().pending_restores += n;
    }

    /// Discards the next `n` swaps (reported through `contents_lost`).
    pub fn lose_next(&self, n: u32) {
        self.lock().pending_losses += n;
    }

    pub fn acquires(&self) -> u64 {
        self.lock().acquires
    }

    pub fn disposes(&self) -> u64 {
        self.lock().disposes
    }

    /// Swap requests, including discarded ones.
    pub fn shows(&self) -> u64 {
        self.lock().shows
    }

    /// Frames that actually reached the screen.
    pub fn presented(&self) -> u64 {
        self.lock().presented
    }

    /// Copy of the most recently presented frame.
    pub fn last_frame(&self) -> Option<Canvas> {
        self.lock().last_frame.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_rotates_back_buffers() {
        let mut hb = HeadlessBuffers::new(2, 2, 2);
        let ctl = hb.control();

        hb.acquire().unwrap();
        hb.back_buffer_mut().clear(Color::RED);
        hb.dispose();
        hb.show().unwrap();

        assert_eq!(ctl.presented(), 1);
        assert_eq!(hb.back_buffer().pixel(0, 0), Some(Color::BLACK));
        assert_eq!(ctl.last_frame().unwrap().pixel(0, 0), Some(Color::RED));
    }

    #[test]
    fn unrealized_buffers_refuse_acquire() {
        let mut hb = HeadlessBuffers::new(2, 2, 2);
        hb.control().set_unrealized(true);
        assert_eq!(hb.acquire(), Err(BufferUnavailable));

        hb.control().set_unrealized(false);
        assert!(hb.acquire().is_ok());
    }

    #[test]
    fn restore_wipes_the_back_buffer() {
        let mut hb = HeadlessBuffers::new(2, 2, 1);
        hb.control().restore_next(1);

        hb.acquire().unwrap();
        hb.back_buffer_mut().clear(Color::GREEN);
        hb.dispose();

        assert!(hb.contents_restored());
        assert_eq!(hb.back_buffer().pixel(1, 1), Some(Color::BLACK));

        hb.acquire().unwrap();
        assert!(!hb.contents_restored());
    }

    #[test]
    fn lost_swaps_are_not_presented() {
        let mut hb = HeadlessBuffers::new(2, 2, 2);
        let ctl = hb.control();
        ctl.lose_next(1);

        hb.acquire().unwrap();
        hb.dispose();
        hb.show().unwrap();

        assert!(hb.contents_lost());
        assert_eq!(ctl.shows(), 1);
        assert_eq!(ctl.presented(), 0);
        assert!(ctl.last_frame().is_none());
    }

    #[test]
    fn at_least_one_buffer() {
        assert_eq!(HeadlessBuffers::new(1, 1, 0).buffer_count(), 1);
    }
}
