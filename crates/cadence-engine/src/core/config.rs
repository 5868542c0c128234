use std::time::Duration;

use crate::render::{Color, RateOverlay};

/// How the update phase consumes frame time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Timestep {
    /// One update per frame with the measured frame delta.
    Variable,
    /// Updates advance in fixed `step` increments drained from an
    /// accumulator; at most `max_steps` per frame, the rest is dropped.
    Fixed { step: Duration, max_steps: u32 },
}

/// Simulation loop configuration.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub title: String,
    /// Drawable width in pixels.
    pub width: u32,
    /// Drawable height in pixels.
    pub height: u32,
    /// Sleep inserted after every frame. A lower bound: slow frames are not
    /// compensated.
    pub pacing: Duration,
    pub timestep: Timestep,
    /// Upper clamp for the frame delta handed to the application.
    pub max_delta: Option<Duration>,
    /// Number of back buffers.
    pub buffers: usize,
    pub background: Color,
    /// Frame-rate label; `None` hides it.
    pub overlay: Option<RateOverlay>,
    /// Pause between attempts while the host has no buffers.
    pub buffer_wait: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            title: "cadence".to_string(),
            width: 640,
            height: 480,
            pacing: Duration::from_millis(10),
            timestep: Timestep::Variable,
            max_delta: None,
            buffers: 2,
            background: Color::BLACK,
            overlay: Some(RateOverlay::default()),
            buffer_wait: Duration::from_millis(5),
        }
    }
}

impl LoopConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_timestep(mut self, timestep: Timestep) -> Self {
        self.timestep = timestep;
        self
    }

    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    pub fn with_buffers(mut self, buffers: usize) -> Self {
        self.buffers = buffers.max(1);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_overlay(mut self, overlay: Option<RateOverlay>) -> Self {
        self.overlay = overlay;
        self
    }
}
