use std::collections::HashMap;

use super::queue::InputQueue;
use super::types::{Key, RawInputEvent};

/// Per-frame view of the keyboard.
///
/// `held` maps a key to the number of `Pressed` events seen since its last
/// `Released` event. With platform key-repeat this grows once per repeat
/// event rather than once per frame, which consumers use for accelerating
/// repeat effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: HashMap<Key, u32>,
    typed: String,
}

impl InputSnapshot {
    /// True while `key` has been pressed and not released since.
    pub fn is_held(&self, key: Key) -> bool {
        self.frames_held(key) > 0
    }

    /// Press count since the last release, 0 if never pressed or released.
    pub fn frames_held(&self, key: Key) -> u32 {
        self.held.get(&key).copied().unwrap_or(0)
    }

    /// Text typed since the previous snapshot only.
    pub fn typed_text(&self) -> &str {
        &self.typed
    }

    /// Keys currently held, in no particular order.
    pub fn held_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.held.keys().copied()
    }

    fn apply(&mut self, event: RawInputEvent) {
        match event {
            RawInputEvent::Pressed(key) => {
                let count = self.held.entry(key).or_insert(0);
                *count = count.saturating_add(1);
            }
            RawInputEvent::Released(key) => {
                self.held.remove(&key);
            }
            RawInputEvent::Typed(ch) => self.typed.push(ch),
        }
    }
}

/// Consumer side of the input pipeline.
///
/// Owned by the simulation thread. `process()` swaps the producer buffer out
/// of the shared `InputQueue` and folds it into the snapshot outside of any
/// lock.
#[derive(Debug)]
pub struct InputAggregator {
    queue: InputQueue,
    snapshot: InputSnapshot,
}

impl InputAggregator {
    pub fn new(queue: InputQueue) -> Self {
        Self {
            queue,
            snapshot: InputSnapshot::default(),
        }
    }

    /// Builds this frame's snapshot from everything queued since the last call.
    pub fn process(&mut self) -> &InputSnapshot {
        let batch = self.queue.take();

        self.snapshot.typed.clear();
        for event in batch {
            self.snapshot.apply(event);
        }

        &self.snapshot
    }

    pub fn snapshot(&self) -> &InputSnapshot {
        &self.snapshot
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.snapshot.is_held(key)
    }

    pub fn frames_held(&self, key: Key) -> u32 {
        self.snapshot.frames_held(key)
    }

    pub fn typed_text(&self) -> &str {
        self.snapshot.typed_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> (InputQueue, InputAggregator) {
        let queue = InputQueue::new();
        let agg = InputAggregator::new(queue.clone());
        (queue, agg)
    }

    #[test]
    fn untouched_keys_are_not_held() {
        let (_, mut agg) = aggregator();
        agg.process();

        assert!(!agg.is_held(Key::A));
        assert_eq!(agg.frames_held(Key::A), 0);
    }

    #[test]
    fn repeated_presses_in_one_batch_count_individually() {
        let (q, mut agg) = aggregator();
        for _ in 0..5 {
            q.on_key_down(Key::ArrowUp);
        }
        agg.process();
        assert_eq!(agg.frames_held(Key::ArrowUp), 5);

        for _ in 0..3 {
            q.on_key_down(Key::ArrowUp);
        }
        agg.process();
        assert_eq!(agg.frames_held(Key::ArrowUp), 8);
    }

    #[test]
    fn held_count_survives_empty_frames() {
        let (q, mut agg) = aggregator();
        q.on_key_down(Key::ArrowDown);
        agg.process();
        agg.process();
        agg.process();

        assert!(agg.is_held(Key::ArrowDown));
        assert_eq!(agg.frames_held(Key::ArrowDown), 1);
    }

    #[test]
    fn release_in_the_middle_of_a_batch_resets_the_count() {
        let (q, mut agg) = aggregator();
        let key = Key::Unknown(65);
        q.on_key_down(key);
        q.on_key_down(key);
        q.on_key_up(key);
        q.on_key_down(key);

        agg.process();
        assert_eq!(agg.frames_held(key), 1);
    }

    #[test]
    fn release_at_the_end_of_a_batch_wins() {
        let (q, mut agg) = aggregator();
        q.on_key_down(Key::Space);
        agg.process();

        q.on_key_down(Key::Space);
        q.on_key_down(Key::Space);
        q.on_key_up(Key::Space);
        agg.process();

        assert!(!agg.is_held(Key::Space));
        assert_eq!(agg.frames_held(Key::Space), 0);
    }

    #[test]
    fn keys_are_tracked_independently() {
        let (q, mut agg) = aggregator();
        q.on_key_down(Key::A);
        q.on_key_down(Key::B);
        q.on_key_up(Key::A);
        agg.process();

        assert!(!agg.is_held(Key::A));
        assert!(agg.is_held(Key::B));
        assert_eq!(agg.snapshot().held_keys().collect::<Vec<_>>(), vec![Key::B]);
    }

    #[test]
    fn typed_text_is_per_frame() {
        let (q, mut agg) = aggregator();
        for ch in "hi!".chars() {
            q.on_char_typed(ch);
        }
        assert_eq!(agg.process().typed_text(), "hi!");

        q.on_char_typed('x');
        assert_eq!(agg.process().typed_text(), "x");

        assert_eq!(agg.process().typed_text(), "");
    }

    #[test]
    fn events_pushed_after_process_land_in_the_next_frame() {
        let (q, mut agg) = aggregator();
        q.on_char_typed('a');
        agg.process();

        q.on_char_typed('b');
        assert_eq!(agg.typed_text(), "a");
        assert_eq!(agg.process().typed_text(), "b");
    }
}
