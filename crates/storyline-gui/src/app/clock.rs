use std::time::{Duration, Instant};

/// Longest step handed to animations after a stall (window hidden, debugger)
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// Frame-to-frame wall clock driving playback and viewport animation
pub(super) struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous call; zero on the first frame
    pub fn tick(&mut self, now: Instant) -> f64 {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME_STEP))
            .unwrap_or_default();
        self.last = Some(now);
        dt.as_secs_f64()
    }
}
