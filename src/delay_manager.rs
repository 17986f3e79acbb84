use std::cell::RefCell;
use std::thread;
use std::time::Duration;

use log::info;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseKind {
    RetryBackoff,
    BetweenItems,
    BetweenBatches,
}

/// Every wait in the pipeline goes through a `Pacer`, so the pacing policy
/// can be swapped without touching the orchestration.
pub trait Pacer {
    fn pause(&self, duration: Duration, kind: PauseKind);
}

/// Blocks the current thread for the requested time.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration, kind: PauseKind) {
        if duration.is_zero() {
            return;
        }
        match kind {
            PauseKind::BetweenBatches => {
                info!("Waiting for {} ms (Batch Delay)...", duration.as_millis())
            }
            _ => log::debug!("Waiting for {} ms ({:?})...", duration.as_millis(), kind),
        }
        thread::sleep(duration);
    }
}

/// Test double: remembers every pause instead of sleeping. Public so
/// integration tests can check the pacing of a whole run.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: RefCell<Vec<(PauseKind, Duration)>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<(PauseKind, Duration)> {
        self.pauses.borrow().clone()
    }

    pub fn count(&self, kind: PauseKind) -> usize {
        self.pauses.borrow().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration, kind: PauseKind) {
        self.pauses.borrow_mut().push((kind, duration));
    }
}

/// Fixed spacing between consecutive items and consecutive batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub item_delay: Duration,
    pub batch_delay: Duration,
}

impl PacingPolicy {
    pub fn from_config(config: &Config) -> Self {
        PacingPolicy {
            item_delay: config.item_delay,
            batch_delay: config.batch_delay,
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_pacer_keeps_order() {
        let pacer = RecordingPacer::new();
        pacer.pause(Duration::from_millis(2000), PauseKind::RetryBackoff);
        pacer.pause(Duration::from_millis(1000), PauseKind::BetweenItems);
        assert_eq!(
            pacer.pauses(),
            vec![
                (PauseKind::RetryBackoff, Duration::from_millis(2000)),
                (PauseKind::BetweenItems, Duration::from_millis(1000)),
            ]
        );
        assert_eq!(pacer.count(PauseKind::BetweenBatches), 0);
    }

    #[test]
    fn test_thread_pacer_sleeps() {
        let start = std::time::Instant::now();
        ThreadPacer.pause(Duration::from_millis(20), PauseKind::BetweenItems);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_default_policy() {
        let policy = PacingPolicy::default();
        assert_eq!(policy.item_delay, Duration::from_millis(1000));
        assert_eq!(policy.batch_delay, Duration::from_millis(5000));
    }
}
