use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{Key, RawInputEvent};

/// Producer side of the input pipeline.
///
/// Cloned into whichever thread delivers platform events. Every entry point
/// appends one event; the consumer swaps the whole buffer out in one step,
/// so the lock is only ever held for a single push or a single swap and a
/// slow frame never blocks event delivery.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: Arc<Mutex<Vec<RawInputEvent>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key_down(&self, key: Key) {
        self.push(RawInputEvent::Pressed(key));
    }

    pub fn on_key_up(&self, key: Key) {
        self.push(RawInputEvent::Released(key));
    }

    pub fn on_char_typed(&self, ch: char) {
        self.push(RawInputEvent::Typed(ch));
    }

    pub fn push(&self, event: RawInputEvent) {
        self.lock().push(event);
    }

    /// Number of events waiting for the next `take`.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Takes every queued event and leaves a fresh empty buffer behind.
    ///
    /// Events pushed after this returns belong to the next batch.
    pub(crate) fn take(&self) -> Vec<RawInputEvent> {
        std::mem::take(&mut *self.lock())
    }

    // A producer that panicked mid-push cannot leave the Vec half-written, so
    // a poisoned lock still guards a consistent buffer.
    fn lock(&self) -> MutexGuard<'_, Vec<RawInputEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn take_drains_in_arrival_order() {
        let q = InputQueue::new();
        q.on_key_down(Key::A);
        q.on_char_typed('a');
        q.on_key_up(Key::A);

        assert_eq!(q.pending(), 3);
        assert_eq!(
            q.take(),
            vec![
                RawInputEvent::Pressed(Key::A),
                RawInputEvent::Typed('a'),
                RawInputEvent::Released(Key::A),
            ]
        );
        assert_eq!(q.pending(), 0);
        assert!(q.take().is_empty());
    }

    #[test]
    fn clones_share_one_buffer() {
        let q = InputQueue::new();
        let producer = q.clone();

        thread::spawn(move || {
            for _ in 0..100 {
                producer.on_key_down(Key::Space);
            }
        })
        .join()
        .unwrap();

        assert_eq!(q.take().len(), 100);
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let q = InputQueue::new();
        let mut taken = Vec::new();

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let p = q.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        p.on_key_down(Key::ArrowUp);
                    }
                })
            })
            .collect();

        while producers.iter().any(|h| !h.is_finished()) {
            taken.extend(q.take());
        }
        for h in producers {
            h.join().unwrap();
        }
        taken.extend(q.take());

        assert_eq!(taken.len(), 2_000);
    }
}
