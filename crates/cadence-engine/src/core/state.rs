use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of an `ApplicationLoop`.
///
/// Transitions only move forward: `Stopped -> Running -> ShuttingDown`.
/// `ShuttingDown` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum LoopState {
    Stopped = 0,
    Running = 1,
    ShuttingDown = 2,
}

impl LoopState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => LoopState::Stopped,
            1 => LoopState::Running,
            _ => LoopState::ShuttingDown,
        }
    }
}

/// Returned when `start` is called on a loop that is not `Stopped`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LoopStateError {
    pub found: LoopState,
}

impl fmt::Display for LoopStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loop cannot start from state {:?}", self.found)
    }
}

impl std::error::Error for LoopStateError {}

/// Shared, monotonic `LoopState`.
#[derive(Debug, Clone, Default)]
pub(crate) struct LoopStateCell(Arc<AtomicU8>);

impl LoopStateCell {
    pub(crate) fn get(&self) -> LoopState {
        LoopState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn is_running(&self) -> bool {
        self.get() == LoopState::Running
    }

    /// `Stopped -> Running`; fails from any other state.
    pub(crate) fn start(&self) -> Result<(), LoopStateError> {
        self.0
            .compare_exchange(
                LoopState::Stopped as u8,
                LoopState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|found| LoopStateError {
                found: LoopState::from_u8(found),
            })
    }

    /// Enters `ShuttingDown` and returns the previous state.
    pub(crate) fn shut_down(&self) -> LoopState {
        LoopState::from_u8(
            self.0
                .fetch_max(LoopState::ShuttingDown as u8, Ordering::AcqRel),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped() {
        assert_eq!(LoopStateCell::default().get(), LoopState::Stopped);
    }

    #[test]
    fn start_only_once() {
        let cell = LoopStateCell::default();
        assert!(cell.start().is_ok());
        assert!(cell.is_running());

        let err = cell.start().unwrap_err();
        assert_eq!(err.found, LoopState::Running);
    }

    #[test]
    fn shutting_down_is_terminal() {
        let cell = LoopStateCell::default();
        cell.start().unwrap();

        assert_eq!(cell.shut_down(), LoopState::Running);
        assert_eq!(cell.shut_down(), LoopState::ShuttingDown);
        assert_eq!(cell.get(), LoopState::ShuttingDown);
        assert!(cell.start().is_err());
    }

    #[test]
    fn close_before_start_prevents_starting() {
        let cell = LoopStateCell::default();
        cell.shut_down();

        assert_eq!(
            cell.start(),
            Err(LoopStateError { found: LoopState::ShuttingDown })
        );
    }
}
