use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

/// Rolling one-second frame counter with a human-readable label.
///
/// Every `calculate()` adds the time elapsed since the previous call to an
/// accumulator and counts one frame. Once the accumulator exceeds one second
/// the label is rebuilt from the frame count, the count restarts and exactly
/// one second is subtracted from the accumulator. The remainder is carried
/// forward so timing error does not build up across windows.
///
/// A single call rolls over at most once. After a stall longer than two
/// seconds the next few calls each roll over and report small counts until
/// the accumulator drains below one second again.
#[derive(Debug, Clone)]
pub struct FrameRate {
    last: Option<Instant>,
    accumulated: Duration,
    frame_count: u32,
    rollovers: u64,
    label: String,
}

impl FrameRate {
    pub fn new() -> Self {
        Self {
            last: None,
            accumulated: Duration::ZERO,
            frame_count: 0,
            rollovers: 0,
            label: format_label(0),
        }
    }

    /// Records the baseline timestamp and resets the label to `"FPS 0"`.
    pub fn initialize(&mut self) {
        self.initialize_at(Instant::now());
    }

    pub fn initialize_at(&mut self, now: Instant) {
        self.last = Some(now);
        self.accumulated = Duration::ZERO;
        self.frame_count = 0;
        self.label = format_label(0);
    }

    /// Counts one frame at the current time.
    pub fn calculate(&mut self) {
        self.calculate_at(Instant::now());
    }

    /// Counts one frame at `now`.
    ///
    /// Calling this before `initialize` takes `now` as the baseline.
    pub fn calculate_at(&mut self, now: Instant) {
        let last = *self.last.get_or_insert(now);

        self.accumulated += now.saturating_duration_since(last);
        self.last = Some(now);
        self.frame_count += 1;

        if self.accumulated > WINDOW {
            self.accumulated -= WINDOW;
            self.label = format_label(self.frame_count);
            self.frame_count = 0;
            self.rollovers += 1;

            log::debug!("frame rate: {}", self.label);
        }
    }

    /// Returns the most recently formatted label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Time accumulated since the last rollover.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Frames counted since the last rollover.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Number of label updates since construction.
    pub fn rollovers(&self) -> u64 {
        self.rollovers
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(count: u32) -> String {
    format!("FPS {count}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn starts_with_zero_placeholder() {
        let mut rate = FrameRate::new();
        assert_eq!(rate.label(), "FPS 0");

        rate.initialize_at(Instant::now());
        assert_eq!(rate.label(), "FPS 0");
    }

    #[test]
    fn rollover_after_one_second() {
        let t0 = Instant::now();
        let mut rate = FrameRate::new();
        rate.initialize_at(t0);

        rate.calculate_at(t0 + ms(400));
        assert_eq!(rate.label(), "FPS 0");
        assert_eq!(rate.rollovers(), 0);

        rate.calculate_at(t0 + ms(1_100));
        assert_eq!(rate.label(), "FPS 2");
        assert_eq!(rate.rollovers(), 1);
        assert_eq!(rate.accumulated(), ms(100));
        assert_eq!(rate.frame_count(), 0);
    }

    #[test]
    fn label_is_stable_between_rollovers() {
        let t0 = Instant::now();
        let mut rate = FrameRate::new();
        rate.initialize_at(t0);
        rate.calculate_at(t0 + ms(1_001));

        let first = rate.label().to_string();
        for i in 1..10 {
            rate.calculate_at(t0 + ms(1_001 + i * 10));
            assert_eq!(rate.label(), first);
        }
    }

    #[test]
    fn exact_second_boundary_waits_for_next_call() {
        let t0 = Instant::now();
        let mut rate = FrameRate::new();
        rate.initialize_at(t0);

        rate.calculate_at(t0 + ms(1_000));
        assert_eq!(rate.rollovers(), 0);

        rate.calculate_at(t0 + ms(1_001));
        assert_eq!(rate.rollovers(), 1);
        assert_eq!(rate.accumulated(), ms(1));
    }

    #[test]
    fn remainder_is_carried_across_many_windows() {
        // 7 ms frames never land on a whole second: 7 * k == 1000 * n has no
        // solution with k below 1000.
        let t0 = Instant::now();
        let mut rate = FrameRate::new();
        rate.initialize_at(t0);

        let frames = 700u64;
        for k in 1..=frames {
            rate.calculate_at(t0 + ms(7 * k));
        }

        let total = 7 * frames;
        assert_eq!(rate.rollovers(), total / 1_000);
        assert_eq!(rate.accumulated(), ms(total % 1_000));
        assert!(rate.accumulated() < WINDOW);
    }

    #[test]
    fn long_stall_produces_back_to_back_rollovers() {
        let t0 = Instant::now();
        let mut rate = FrameRate::new();
        rate.initialize_at(t0);

        rate.calculate_at(t0 + ms(2_500));
        assert_eq!(rate.label(), "FPS 1");
        assert_eq!(rate.accumulated(), ms(1_500));

        rate.calculate_at(t0 + ms(2_510));
        assert_eq!(rate.label(), "FPS 1");
        assert_eq!(rate.accumulated(), ms(510));
        assert_eq!(rate.rollovers(), 2);
    }

    #[test]
    fn calculate_without_initialize_uses_first_call_as_baseline() {
        let t0 = Instant::now();
        let mut rate = FrameRate::new();

        rate.calculate_at(t0);
        assert_eq!(rate.accumulated(), Duration::ZERO);
        assert_eq!(rate.frame_count(), 1);

        rate.calculate_at(t0 + ms(1_200));
        assert_eq!(rate.label(), "FPS 2");
    }
}
