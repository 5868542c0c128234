use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// The same delta at full resolution, for accumulators.
    pub delta: Duration,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots for the simulation loop.
///
/// The delta is the raw monotonic elapsed time. Slow frames are not
/// compensated for: a frame that overruns its pacing budget simply yields a
/// larger delta on the next tick.
///
/// An optional upper clamp keeps downstream systems stable after the thread
/// was descheduled for a long time (debugger pause, suspended laptop).
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    max_delta: Option<Duration>,
}

impl FrameClock {
    /// Creates an unclamped clock whose baseline is "now".
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates an unclamped clock with an explicit baseline.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            frame_index: 0,
            max_delta: None,
        }
    }

    /// Clamps every produced delta to at most `max_delta`.
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    /// Resets the clock baseline.
    ///
    /// The loop calls this right after the application's `initialize` hook so a
    /// slow initialization does not show up as the first frame's delta.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    ///
    /// A `now` earlier than the previous tick yields a zero delta.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let mut dt = now.saturating_duration_since(self.last);

        if let Some(max) = self.max_delta {
            dt = dt.min(max);
        }

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            delta: dt,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
