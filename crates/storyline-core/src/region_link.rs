//! Linked region editing: segments over one continuous source where moving a
//! boundary drags the touching neighbour along, with debounced undo history.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TimelineError};
use crate::history::{Debouncer, EditHistory};
use crate::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryEdge {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionLinkConfig {
    /// Neighbours closer than this already count as joined
    pub epsilon: f64,
    /// Shortest region a drag may leave behind, in seconds
    pub min_duration: f64,
    pub history_depth: usize,
    /// Quiet time after the last edit before it is committed to history
    pub debounce_ms: u64,
}

impl Default for RegionLinkConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-3,
            min_duration: 0.1,
            history_depth: 50,
            debounce_ms: 400,
        }
    }
}

#[derive(Debug)]
pub struct RegionEditor {
    config: RegionLinkConfig,
    segments: Vec<Segment>,
    /// State as of the last commit; what an undo returns to
    settled: Vec<Segment>,
    history: EditHistory<Vec<Segment>>,
    debounce: Debouncer,
}

impl RegionEditor {
    pub fn new(config: RegionLinkConfig, segments: Vec<Segment>) -> Self {
        let segments = sorted(segments);
        Self {
            config,
            settled: segments.clone(),
            segments,
            history: EditHistory::new(config.history_depth),
            debounce: Debouncer::new(Duration::from_millis(config.debounce_ms)),
        }
    }

    pub fn config(&self) -> &RegionLinkConfig {
        &self.config
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn has_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Time until the pending edit commits
    pub fn pending_remaining(&self, now: Instant) -> Option<Duration> {
        self.debounce.remaining(now)
    }

    /// Move one boundary of segment `index` to `time` and pull the touching
    /// neighbour boundary along. Returns the updated list.
    pub fn set_boundary(&mut self, index: usize, edge: BoundaryEdge, time: f64, now: Instant) -> Result<&[Segment]> {
        if !time.is_finite() {
            return Err(TimelineError::InvalidTimeRange { start: time, end: time });
        }
        let pos = self
            .segments
            .iter()
            .position(|s| s.index == index)
            .ok_or(TimelineError::SegmentNotFound(index))?;
        let min = self.config.min_duration;
        let eps = self.config.epsilon;

        match edge {
            BoundaryEdge::Start => {
                let end = self.segments[pos].end_time;
                let floor = match pos.checked_sub(1) {
                    Some(prev) => self.segments[prev].start_time + min,
                    None => 0.0,
                };
                let start = time.max(floor).min(end - min).max(0.0);
                self.segments[pos].start_time = start;

                if let Some(prev) = pos.checked_sub(1).map(|p| &mut self.segments[p]) {
                    if (prev.end_time - start).abs() > eps {
                        prev.end_time = start;
                    }
                }
            }
            BoundaryEdge::End => {
                let start = self.segments[pos].start_time;
                let ceiling = self
                    .segments
                    .get(pos + 1)
                    .map(|next| next.end_time - min)
                    .unwrap_or(f64::INFINITY);
                let end = time.min(ceiling).max(start + min);
                self.segments[pos].end_time = end;

                if let Some(next) = self.segments.get_mut(pos + 1) {
                    if (next.start_time - end).abs() > eps {
                        next.start_time = end;
                    }
                }
            }
        }

        self.debounce.touch(now);
        Ok(&self.segments)
    }

    /// Commit the pending edit once the debounce window has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.debounce.poll(now) {
            return false;
        }
        self.commit();
        true
    }

    /// Commit any pending edit, then restore the previous settled state
    pub fn undo(&mut self) -> Option<&[Segment]> {
        if self.debounce.is_pending() {
            self.debounce.cancel();
            self.commit();
        }
        let previous = self.history.undo()?;
        info!(remaining = self.history.len(), "Region edit undone");
        self.segments = previous.clone();
        self.settled = previous;
        Some(&self.segments)
    }

    /// Drop the pending debounce without committing
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    fn commit(&mut self) {
        if self.segments == self.settled {
            return;
        }
        let before = std::mem::replace(&mut self.settled, self.segments.clone());
        self.history.record(before);
        debug!(depth = self.history.len(), "Region edit settled");
    }
}

fn sorted(mut segments: Vec<Segment>) -> Vec<Segment> {
    segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> RegionEditor {
        RegionEditor::new(
            RegionLinkConfig::default(),
            vec![
                Segment::new(1, 0.0, 5.0, "a").unwrap(),
                Segment::new(2, 5.0, 9.0, "b").unwrap(),
                Segment::new(3, 9.0, 12.0, "c").unwrap(),
            ],
        )
    }

    fn bounds(segments: &[Segment]) -> Vec<(f64, f64)> {
        segments.iter().map(|s| (s.start_time, s.end_time)).collect()
    }

    #[test]
    fn test_start_drag_pulls_previous_end() {
        let mut ed = editor();
        let segs = ed.set_boundary(2, BoundaryEdge::Start, 6.0, Instant::now()).unwrap();
        assert_eq!(bounds(segs), vec![(0.0, 6.0), (6.0, 9.0), (9.0, 12.0)]);
    }

    #[test]
    fn test_end_drag_pulls_next_start() {
        let mut ed = editor();
        let segs = ed.set_boundary(2, BoundaryEdge::End, 8.0, Instant::now()).unwrap();
        assert_eq!(bounds(segs), vec![(0.0, 5.0), (5.0, 8.0), (8.0, 12.0)]);
    }

    #[test]
    fn test_edited_region_keeps_min_duration() {
        let mut ed = editor();
        let segs = ed.set_boundary(2, BoundaryEdge::Start, 20.0, Instant::now()).unwrap();
        let (start, end) = (segs[1].start_time, segs[1].end_time);
        assert!((end - start - 0.1).abs() < 1e-9);
        assert_eq!(segs[0].end_time, start);

        let segs = ed.set_boundary(1, BoundaryEdge::End, -4.0, Instant::now()).unwrap();
        assert!((segs[0].end_time - 0.1).abs() < 1e-9);
        assert_eq!(segs[1].start_time, segs[0].end_time);
    }

    #[test]
    fn test_neighbour_keeps_min_duration() {
        let mut ed = editor();
        let segs = ed.set_boundary(3, BoundaryEdge::Start, 1.0, Instant::now()).unwrap();
        assert!((segs[1].duration() - 0.1).abs() < 1e-9);
        assert!(segs.iter().all(|s| s.validate().is_ok()));
    }

    #[test]
    fn test_unknown_segment() {
        let mut ed = editor();
        assert_eq!(
            ed.set_boundary(9, BoundaryEdge::Start, 1.0, Instant::now()).unwrap_err(),
            TimelineError::SegmentNotFound(9)
        );
        assert!(!ed.has_pending());
    }

    #[test]
    fn test_drag_frames_collapse_into_one_history_entry() {
        let t0 = Instant::now();
        let mut ed = editor();
        for (i, time) in [5.5, 6.0, 6.5, 7.0].into_iter().enumerate() {
            ed.set_boundary(2, BoundaryEdge::Start, time, t0 + Duration::from_millis(50 * i as u64))
                .unwrap();
            assert!(!ed.poll(t0 + Duration::from_millis(50 * i as u64 + 10)));
        }
        assert!(ed.poll(t0 + Duration::from_millis(1000)));
        assert_eq!(ed.history_len(), 1);

        let restored = ed.undo().unwrap();
        assert_eq!(bounds(restored), vec![(0.0, 5.0), (5.0, 9.0), (9.0, 12.0)]);
        assert!(ed.undo().is_none());
    }

    #[test]
    fn test_undo_commits_pending_edit_first() {
        let t0 = Instant::now();
        let mut ed = editor();
        ed.set_boundary(2, BoundaryEdge::Start, 6.0, t0).unwrap();
        assert!(ed.poll(t0 + Duration::from_secs(1)));
        ed.set_boundary(2, BoundaryEdge::End, 10.0, t0 + Duration::from_secs(2)).unwrap();

        let restored = ed.undo().unwrap();
        assert_eq!(bounds(restored), vec![(0.0, 6.0), (6.0, 9.0), (9.0, 12.0)]);
        let restored = ed.undo().unwrap();
        assert_eq!(bounds(restored), vec![(0.0, 5.0), (5.0, 9.0), (9.0, 12.0)]);
    }

    #[test]
    fn test_history_depth_bound() {
        let t0 = Instant::now();
        let config = RegionLinkConfig { history_depth: 2, ..Default::default() };
        let mut ed = RegionEditor::new(config, editor().segments().to_vec());
        for i in 0..5u64 {
            let now = t0 + Duration::from_secs(i);
            ed.set_boundary(2, BoundaryEdge::Start, 5.0 + 0.5 * (i + 1) as f64, now).unwrap();
            assert!(ed.poll(now + Duration::from_millis(500)));
        }
        assert_eq!(ed.history_len(), 2);
    }
}
