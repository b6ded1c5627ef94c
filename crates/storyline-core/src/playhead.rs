//! Playhead position, transport flags and exact stop-at-cut

use tracing::debug;

use crate::coords::CoordinateMapper;

/// Distance from a stop point at which playback snaps onto it
pub const STOP_EPSILON: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayheadState {
    pub current_time: f64,
    pub is_playing: bool,
    /// External time updates are ignored while the user holds the playhead
    pub is_dragging: bool,
    /// Hard stop, usually the end of the segment being played
    pub stop_at: Option<f64>,
}

/// Outcome of one playback time update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackTick {
    /// Not playing, or update suppressed by a drag
    Idle,
    Advanced(f64),
    /// Reached the stop point; time snapped exactly onto it and paused
    StoppedAtCut(f64),
    /// Reached the end of the project and paused
    ReachedEnd(f64),
}

#[derive(Debug, Default)]
pub struct PlayheadSync {
    state: PlayheadState,
    duration: f64,
    /// Set by `begin_drag`, consumed by `end_drag`
    resume_after_drag: bool,
}

impl PlayheadSync {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            ..Default::default()
        }
    }

    pub fn state(&self) -> &PlayheadState {
        &self.state
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        self.state.current_time = self.state.current_time.min(self.duration);
    }

    /// Pixel of the playhead, or `None` when it is outside `[0, width]`
    pub fn pixel_position(&self, mapper: &CoordinateMapper, width: f64) -> Option<f64> {
        let x = mapper.time_to_pixel(self.state.current_time);
        mapper.is_visible(x, width).then_some(x)
    }

    pub fn play(&mut self) {
        if self.state.current_time >= self.duration - STOP_EPSILON {
            self.state.current_time = 0.0;
        }
        self.state.is_playing = true;
    }

    /// Play from `start` and stop exactly at `stop_at`
    pub fn play_range(&mut self, start: f64, stop_at: f64) {
        self.state.current_time = start.clamp(0.0, self.duration);
        self.state.stop_at = Some(stop_at.min(self.duration));
        self.state.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.state.is_playing = false;
        self.state.stop_at = None;
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Explicit user seek. Always applies, even mid-drag.
    pub fn seek(&mut self, time: f64) {
        self.state.current_time = time.clamp(0.0, self.duration);
        if self.state.stop_at.is_some_and(|stop| self.state.current_time >= stop) {
            self.state.stop_at = None;
        }
    }

    /// Pause for a drag, remembering whether to resume
    pub fn begin_drag(&mut self) {
        if self.state.is_dragging {
            return;
        }
        self.resume_after_drag = self.state.is_playing;
        self.state.is_playing = false;
        self.state.is_dragging = true;
    }

    /// Resume playback if it was running when the drag began
    pub fn end_drag(&mut self) {
        if !self.state.is_dragging {
            return;
        }
        self.state.is_dragging = false;
        if std::mem::take(&mut self.resume_after_drag) {
            self.state.is_playing = true;
        }
    }

    /// Time reported by the playback clock
    pub fn update_time(&mut self, time: f64) -> PlaybackTick {
        if !self.state.is_playing || self.state.is_dragging {
            return PlaybackTick::Idle;
        }

        if let Some(stop) = self.state.stop_at {
            if time >= stop - STOP_EPSILON {
                self.state.current_time = stop;
                self.state.is_playing = false;
                self.state.stop_at = None;
                debug!(time = stop, "Stopped at cut");
                return PlaybackTick::StoppedAtCut(stop);
            }
        }

        if time >= self.duration {
            self.state.current_time = self.duration;
            self.state.is_playing = false;
            return PlaybackTick::ReachedEnd(self.duration);
        }

        self.state.current_time = time.max(0.0);
        PlaybackTick::Advanced(self.state.current_time)
    }

    /// Advance the playhead by `dt` seconds of wall-clock time
    pub fn advance(&mut self, dt: f64) -> PlaybackTick {
        self.update_time(self.state.current_time + dt.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_position_hides_off_screen() {
        let mut sync = PlayheadSync::new(120.0);
        sync.seek(10.0);
        let mapper = CoordinateMapper::new(50.0, 0.0);
        assert_eq!(sync.pixel_position(&mapper, 1000.0), Some(500.0));
        assert_eq!(sync.pixel_position(&CoordinateMapper::new(50.0, 600.0), 1000.0), None);
        assert_eq!(sync.pixel_position(&CoordinateMapper::new(200.0, 0.0), 1000.0), None);
    }

    #[test]
    fn test_stop_at_cut_snaps_exactly() {
        let mut sync = PlayheadSync::new(60.0);
        sync.play_range(3.0, 5.0);

        let mut last = PlaybackTick::Idle;
        for _ in 0..200 {
            last = sync.advance(1.0 / 60.0);
            if !sync.is_playing() {
                break;
            }
        }
        assert_eq!(last, PlaybackTick::StoppedAtCut(5.0));
        assert_eq!(sync.current_time(), 5.0);
        assert!(sync.state().stop_at.is_none());
    }

    #[test]
    fn test_stop_epsilon_catches_near_miss() {
        let mut sync = PlayheadSync::new(60.0);
        sync.play_range(4.0, 5.0);
        assert_eq!(sync.update_time(4.99), PlaybackTick::StoppedAtCut(5.0));
    }

    #[test]
    fn test_external_updates_ignored_while_dragging() {
        let mut sync = PlayheadSync::new(60.0);
        sync.play();
        sync.begin_drag();
        assert!(!sync.is_playing());
        assert_eq!(sync.update_time(20.0), PlaybackTick::Idle);

        sync.seek(7.0);
        assert_eq!(sync.current_time(), 7.0);

        sync.end_drag();
        assert!(sync.is_playing());
        assert_eq!(sync.advance(0.5), PlaybackTick::Advanced(7.5));
    }

    #[test]
    fn test_drag_while_paused_does_not_resume() {
        let mut sync = PlayheadSync::new(60.0);
        sync.begin_drag();
        sync.end_drag();
        assert!(!sync.is_playing());
    }

    #[test]
    fn test_reaches_end_and_restarts() {
        let mut sync = PlayheadSync::new(2.0);
        sync.play();
        assert_eq!(sync.advance(5.0), PlaybackTick::ReachedEnd(2.0));
        assert!(!sync.is_playing());
        sync.toggle();
        assert_eq!(sync.current_time(), 0.0);
        assert!(sync.is_playing());
    }
}
