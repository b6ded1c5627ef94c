//! Bounded undo history and a debounce timer for settling edits

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Snapshots of settled states, oldest dropped first once `depth` is reached
#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    snapshots: VecDeque<T>,
    depth: usize,
}

impl<T> EditHistory<T> {
    pub fn new(depth: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(depth.min(64)),
            depth: depth.max(1),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn record(&mut self, snapshot: T) {
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Most recent snapshot, removed from the history
    pub fn undo(&mut self) -> Option<T> {
        self.snapshots.pop_back()
    }

}

/// Fires once `delay` after the last `touch`. Time is passed in, never read.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the window from `now`
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when the window has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the window elapses, for scheduling a repaint
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut history = EditHistory::new(3);
        for i in 0..5 {
            history.record(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(4));
        assert_eq!(history.undo(), Some(3));
        assert_eq!(history.undo(), Some(2));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_debounce_fires_once_after_last_touch() {
        let t0 = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(500));
        assert!(!debounce.poll(t0));

        debounce.touch(t0);
        debounce.touch(t0 + Duration::from_millis(300));
        assert!(!debounce.poll(t0 + Duration::from_millis(600)));
        assert_eq!(
            debounce.remaining(t0 + Duration::from_millis(600)),
            Some(Duration::from_millis(200))
        );
        assert!(debounce.poll(t0 + Duration::from_millis(800)));
        assert!(!debounce.poll(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(10));
        debounce.touch(t0);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.poll(t0 + Duration::from_secs(1)));
    }
}
