//! Pointer gestures on the timeline: click-to-seek, playhead scrub,
//! clip move/trim and linked boundary drags.
//!
//! The controller never reads cached viewport state. Every call receives the
//! current [`PointerContext`], so a drag that outlives a zoom or scroll still
//! resolves times against what is on screen.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clip::{AudioClip, ClipId, ClipPatch, MIN_CLIP_DURATION};
use crate::coords::CoordinateMapper;
use crate::region_link::BoundaryEdge;
use crate::segment::{find_segment_at, Segment};
use crate::viewport::{ViewportController, ZoomAnchor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Width of the trim handles on each clip edge, in screen pixels
    pub edge_threshold_px: f64,
    /// Pointer travel below which a press still counts as a click
    pub click_slop_px: f64,
    /// Zoom factor per pixel of vertical wheel travel with the zoom modifier held
    pub wheel_zoom_sensitivity: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            edge_threshold_px: 8.0,
            click_slop_px: 3.0,
            wheel_zoom_sensitivity: 0.008,
        }
    }
}

/// Which editing model the pointer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Discrete audio clips that move and trim independently
    #[default]
    Clips,
    /// Segment boundaries over one continuous source, neighbours stay joined
    LinkedRegions,
}

/// Timeline area under the pointer when a press starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    PlayheadHandle,
    Ruler,
    SegmentTrack,
    AudioTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragMode {
    Move,
    TrimLeft,
    TrimRight,
}

/// Clip fields captured when a drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub pointer_time: f64,
    pub start_time: f64,
    pub duration: f64,
    pub offset: f64,
}

impl DragOrigin {
    pub fn from_clip(clip: &AudioClip, pointer_time: f64) -> Self {
        Self {
            pointer_time,
            start_time: clip.start_time,
            duration: clip.duration,
            offset: clip.offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipGrab {
    pub id: ClipId,
    pub mode: DragMode,
    pub origin: DragOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Button down, not yet moved past the click slop
    Pressed {
        x: f64,
        target: PointerTarget,
        clip: Option<ClipGrab>,
        /// Moved too far to be a click but nothing to drag
        cancelled: bool,
    },
    ScrubPlayhead,
    DragClip(ClipGrab),
    DragBoundary { index: usize, edge: BoundaryEdge },
}

impl Gesture {
    /// A drag that already announced `InteractionStart`
    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            Gesture::ScrubPlayhead | Gesture::DragClip(_) | Gesture::DragBoundary { .. }
        )
    }
}

/// What the host should do in response to pointer input
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// Pause hook: a drag began
    InteractionStart,
    /// Resume-if-was-playing hook: a drag ended
    InteractionEnd,
    Seek(f64),
    SegmentClick(usize),
    SelectClip(ClipId),
    UpdateAudioClip { id: ClipId, patch: ClipPatch },
    MoveBoundary { index: usize, edge: BoundaryEdge, time: f64 },
}

/// Cursor to show while hovering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Grab,
    Grabbing,
    ResizeHorizontal,
}

/// Fresh per-event view of the timeline
#[derive(Debug, Clone, Copy)]
pub struct PointerContext<'a> {
    pub mapper: CoordinateMapper,
    pub duration: f64,
    pub segments: &'a [Segment],
    pub clips: &'a [AudioClip],
}

/// Find the clip under `time` and the drag mode its position selects.
///
/// The edge threshold is given in pixels and converted to seconds at the
/// current zoom, so handles keep a constant on-screen size. Later clips are
/// drawn on top and win.
pub fn hit_test_clip(
    clips: &[AudioClip],
    time: f64,
    pixels_per_second: f64,
    edge_threshold_px: f64,
) -> Option<(ClipId, DragMode)> {
    let threshold = edge_threshold_px / pixels_per_second;

    clips.iter().rev().find_map(|clip| {
        let to_left = (time - clip.start_time).abs();
        let to_right = (time - clip.end_time()).abs();
        if to_left.min(to_right) <= threshold {
            let mode = if to_left <= to_right { DragMode::TrimLeft } else { DragMode::TrimRight };
            return Some((clip.id, mode));
        }
        clip.contains(time).then_some((clip.id, DragMode::Move))
    })
}

/// Nearest segment boundary within the threshold. When two segments share a
/// boundary, the one the pointer is inside wins.
pub fn hit_test_boundary(
    segments: &[Segment],
    time: f64,
    pixels_per_second: f64,
    edge_threshold_px: f64,
) -> Option<(usize, BoundaryEdge)> {
    let threshold = edge_threshold_px / pixels_per_second;

    segments
        .iter()
        .flat_map(|s| {
            [(s, BoundaryEdge::Start, s.start_time), (s, BoundaryEdge::End, s.end_time)]
        })
        .filter_map(|(s, edge, at)| {
            let distance = (time - at).abs();
            let inside = s.contains(time) || (edge == BoundaryEdge::End && time == s.end_time);
            (distance <= threshold).then_some((distance, !inside, s.index, edge))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, _, index, edge)| (index, edge))
}

/// Clip fields after dragging `delta` seconds from `origin`.
///
/// Constraint violations are clamped, never reported: duration stays at or
/// above [`MIN_CLIP_DURATION`], offset and start time stay non-negative.
pub fn apply_drag(mode: DragMode, origin: &DragOrigin, delta: f64) -> ClipPatch {
    match mode {
        DragMode::Move => ClipPatch {
            start_time: Some((origin.start_time + delta).max(0.0)),
            ..Default::default()
        },
        DragMode::TrimRight => ClipPatch {
            duration: Some((origin.duration + delta).max(MIN_CLIP_DURATION)),
            ..Default::default()
        },
        DragMode::TrimLeft => {
            let mut effective = delta;
            if origin.duration - effective < MIN_CLIP_DURATION {
                effective = origin.duration - MIN_CLIP_DURATION;
            }
            if origin.offset + effective < 0.0 {
                effective = -origin.offset;
            }
            if origin.start_time + effective < 0.0 {
                effective = -origin.start_time;
            }
            ClipPatch {
                start_time: Some(origin.start_time + effective),
                duration: Some(origin.duration - effective),
                offset: Some(origin.offset + effective),
            }
        }
    }
}

/// Owns the gesture state machine. At most one gesture is live at a time.
#[derive(Debug, Default)]
pub struct InteractionController {
    config: InteractionConfig,
    mode: EditMode,
    gesture: Gesture,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            mode: EditMode::default(),
            gesture: Gesture::Idle,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Switching modes abandons any live gesture
    pub fn set_mode(&mut self, mode: EditMode) -> Vec<TimelineEvent> {
        if mode == self.mode {
            return Vec::new();
        }
        let events = self.teardown();
        self.mode = mode;
        events
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn pointer_down(&mut self, x: f64, target: PointerTarget, ctx: &PointerContext<'_>) -> Vec<TimelineEvent> {
        if self.is_active() {
            return Vec::new();
        }

        let time = ctx.mapper.pixel_to_time(x);
        let pps = ctx.mapper.pixels_per_second;

        match (target, self.mode) {
            (PointerTarget::PlayheadHandle, _) => {
                debug!("Playhead drag started");
                self.gesture = Gesture::ScrubPlayhead;
                return vec![TimelineEvent::InteractionStart];
            }
            (PointerTarget::SegmentTrack, EditMode::LinkedRegions) => {
                if let Some((index, edge)) =
                    hit_test_boundary(ctx.segments, time, pps, self.config.edge_threshold_px)
                {
                    debug!(index, ?edge, "Boundary drag started");
                    self.gesture = Gesture::DragBoundary { index, edge };
                    return vec![TimelineEvent::InteractionStart];
                }
            }
            _ => {}
        }

        let clip = match (target, self.mode) {
            (PointerTarget::AudioTrack, EditMode::Clips) => {
                hit_test_clip(ctx.clips, time, pps, self.config.edge_threshold_px).and_then(|(id, mode)| {
                    let clip = ctx.clips.iter().find(|c| c.id == id)?;
                    Some(ClipGrab {
                        id,
                        mode,
                        origin: DragOrigin::from_clip(clip, time),
                    })
                })
            }
            _ => None,
        };

        self.gesture = Gesture::Pressed {
            x,
            target,
            clip,
            cancelled: false,
        };
        Vec::new()
    }

    pub fn pointer_move(&mut self, x: f64, ctx: &PointerContext<'_>) -> Vec<TimelineEvent> {
        let time = ctx.mapper.pixel_to_time(x);

        match self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Pressed {
                x: press_x,
                target,
                clip,
                cancelled,
            } => {
                if cancelled || (x - press_x).abs() <= self.config.click_slop_px {
                    return Vec::new();
                }
                if let Some(grab) = clip {
                    debug!(clip = %grab.id, mode = ?grab.mode, "Clip drag started");
                    self.gesture = Gesture::DragClip(grab);
                    let mut events = vec![TimelineEvent::InteractionStart];
                    events.push(Self::clip_update(&grab, time));
                    return events;
                }
                if target == PointerTarget::Ruler {
                    debug!("Ruler scrub started");
                    self.gesture = Gesture::ScrubPlayhead;
                    return vec![
                        TimelineEvent::InteractionStart,
                        TimelineEvent::Seek(time.clamp(0.0, ctx.duration.max(0.0))),
                    ];
                }
                self.gesture = Gesture::Pressed {
                    x: press_x,
                    target,
                    clip,
                    cancelled: true,
                };
                Vec::new()
            }
            Gesture::ScrubPlayhead => {
                vec![TimelineEvent::Seek(time.clamp(0.0, ctx.duration.max(0.0)))]
            }
            Gesture::DragClip(grab) => vec![Self::clip_update(&grab, time)],
            Gesture::DragBoundary { index, edge } => vec![TimelineEvent::MoveBoundary {
                index,
                edge,
                time: time.clamp(0.0, ctx.duration.max(0.0)),
            }],
        }
    }

    pub fn pointer_up(&mut self, x: f64, ctx: &PointerContext<'_>) -> Vec<TimelineEvent> {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Pressed { cancelled: true, .. } => Vec::new(),
            Gesture::Pressed { clip, .. } => {
                let time = ctx.mapper.pixel_to_time(x);
                let mut events = Vec::new();
                if let Some(segment) = find_segment_at(ctx.segments, time) {
                    events.push(TimelineEvent::SegmentClick(segment.index));
                }
                if let Some(grab) = clip {
                    events.push(TimelineEvent::SelectClip(grab.id));
                }
                events.push(TimelineEvent::Seek(time.clamp(0.0, ctx.duration.max(0.0))));
                events
            }
            Gesture::ScrubPlayhead | Gesture::DragClip(_) | Gesture::DragBoundary { .. } => {
                debug!("Drag ended");
                vec![TimelineEvent::InteractionEnd]
            }
        }
    }

    /// Wheel input: zoom around the playhead with the modifier held, pan otherwise
    pub fn wheel(
        &self,
        delta_x: f64,
        delta_y: f64,
        zoom_modifier: bool,
        playhead_time: f64,
        viewport: &mut ViewportController,
    ) {
        if zoom_modifier {
            if delta_y.abs() > 0.1 {
                let factor = 1.0 + delta_y * self.config.wheel_zoom_sensitivity;
                viewport.zoom_by(factor.max(0.1), ZoomAnchor::Time(playhead_time));
            }
            return;
        }

        let delta = if delta_x.abs() > 0.0 { delta_x } else { delta_y };
        if delta.abs() > 0.0 {
            viewport.pan_by(-delta);
        }
    }

    /// Cursor for the current hover position
    pub fn hover(&self, x: f64, target: PointerTarget, ctx: &PointerContext<'_>) -> CursorHint {
        match self.gesture {
            Gesture::DragClip(ClipGrab { mode: DragMode::Move, .. }) => return CursorHint::Grabbing,
            Gesture::DragClip(_) | Gesture::DragBoundary { .. } => return CursorHint::ResizeHorizontal,
            Gesture::ScrubPlayhead => return CursorHint::ResizeHorizontal,
            _ => {}
        }

        let time = ctx.mapper.pixel_to_time(x);
        let pps = ctx.mapper.pixels_per_second;
        match (target, self.mode) {
            (PointerTarget::PlayheadHandle, _) => CursorHint::ResizeHorizontal,
            (PointerTarget::AudioTrack, EditMode::Clips) => {
                match hit_test_clip(ctx.clips, time, pps, self.config.edge_threshold_px) {
                    Some((_, DragMode::Move)) => CursorHint::Grab,
                    Some(_) => CursorHint::ResizeHorizontal,
                    None => CursorHint::Default,
                }
            }
            (PointerTarget::SegmentTrack, EditMode::LinkedRegions) => {
                if hit_test_boundary(ctx.segments, time, pps, self.config.edge_threshold_px).is_some() {
                    CursorHint::ResizeHorizontal
                } else {
                    CursorHint::Default
                }
            }
            _ => CursorHint::Default,
        }
    }

    /// Drop any live gesture. A started drag still gets its `InteractionEnd`.
    pub fn teardown(&mut self) -> Vec<TimelineEvent> {
        let gesture = std::mem::take(&mut self.gesture);
        if gesture.is_dragging() {
            debug!("Gesture torn down mid-drag");
            vec![TimelineEvent::InteractionEnd]
        } else {
            Vec::new()
        }
    }

    fn clip_update(grab: &ClipGrab, time: f64) -> TimelineEvent {
        let delta = time - grab.origin.pointer_time;
        TimelineEvent::UpdateAudioClip {
            id: grab.id,
            patch: apply_drag(grab.mode, &grab.origin, delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::SourceId;

    fn clip(id: u64, start: f64, duration: f64, offset: f64) -> AudioClip {
        let mut clip = AudioClip::new(ClipId(id), SourceId("a.wav".into()), start, duration);
        clip.offset = offset;
        clip
    }

    fn origin(start: f64, duration: f64, offset: f64) -> DragOrigin {
        DragOrigin {
            pointer_time: 0.0,
            start_time: start,
            duration,
            offset,
        }
    }

    fn ctx<'a>(segments: &'a [Segment], clips: &'a [AudioClip]) -> PointerContext<'a> {
        PointerContext {
            mapper: CoordinateMapper::new(10.0, 0.0),
            duration: 60.0,
            segments,
            clips,
        }
    }

    fn apply(clip: &mut AudioClip, events: &[TimelineEvent]) {
        for event in events {
            if let TimelineEvent::UpdateAudioClip { id, patch } = event {
                if *id == clip.id {
                    clip.apply(patch);
                }
            }
        }
    }

    #[test]
    fn test_trim_left_clamps_at_source_start() {
        let patch = apply_drag(DragMode::TrimLeft, &origin(5.0, 10.0, 2.0), -3.0);
        assert_eq!(patch.start_time, Some(3.0));
        assert_eq!(patch.duration, Some(12.0));
        assert_eq!(patch.offset, Some(0.0));
    }

    #[test]
    fn test_trim_left_clamps_at_min_duration() {
        let patch = apply_drag(DragMode::TrimLeft, &origin(5.0, 10.0, 2.0), 50.0);
        assert!((patch.duration.unwrap() - MIN_CLIP_DURATION).abs() < 1e-9);
        assert!((patch.start_time.unwrap() - 14.9).abs() < 1e-9);
        assert!((patch.offset.unwrap() - 11.9).abs() < 1e-9);
    }

    #[test]
    fn test_move_and_trim_right_clamps() {
        let o = origin(5.0, 10.0, 2.0);
        assert_eq!(apply_drag(DragMode::Move, &o, -20.0).start_time, Some(0.0));
        assert_eq!(apply_drag(DragMode::Move, &o, 2.5).start_time, Some(7.5));
        assert_eq!(apply_drag(DragMode::TrimRight, &o, -20.0).duration, Some(MIN_CLIP_DURATION));
        assert_eq!(apply_drag(DragMode::TrimRight, &o, 4.0).duration, Some(14.0));
    }

    #[test]
    fn test_drag_never_violates_constraints() {
        let origins = [
            origin(0.0, 0.1, 0.0),
            origin(5.0, 10.0, 2.0),
            origin(1.0, 3.0, 50.0),
            origin(100.0, 0.5, 0.0),
        ];
        for o in &origins {
            for step in -400..=400 {
                let delta = step as f64 * 0.37;
                for mode in [DragMode::Move, DragMode::TrimLeft, DragMode::TrimRight] {
                    let mut c = clip(1, o.start_time, o.duration, o.offset);
                    c.apply(&apply_drag(mode, o, delta));
                    assert!(c.duration >= MIN_CLIP_DURATION - 1e-9, "{:?} {} {:?}", mode, delta, c);
                    assert!(c.offset >= -1e-9, "{:?} {} {:?}", mode, delta, c);
                    assert!(c.start_time >= -1e-9, "{:?} {} {:?}", mode, delta, c);
                }
            }
        }
    }

    #[test]
    fn test_trim_left_keeps_right_edge_fixed() {
        let o = origin(5.0, 10.0, 2.0);
        for delta in [-1.5, -0.5, 0.25, 4.0, 9.8] {
            let p = apply_drag(DragMode::TrimLeft, &o, delta);
            let end = p.start_time.unwrap() + p.duration.unwrap();
            assert!((end - 15.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hit_test_threshold_scales_with_zoom() {
        let clips = vec![clip(1, 10.0, 10.0, 0.0)];
        // 8px at 10 px/s = 0.8s handles
        assert_eq!(hit_test_clip(&clips, 10.5, 10.0, 8.0), Some((ClipId(1), DragMode::TrimLeft)));
        assert_eq!(hit_test_clip(&clips, 9.5, 10.0, 8.0), Some((ClipId(1), DragMode::TrimLeft)));
        assert_eq!(hit_test_clip(&clips, 19.5, 10.0, 8.0), Some((ClipId(1), DragMode::TrimRight)));
        assert_eq!(hit_test_clip(&clips, 15.0, 10.0, 8.0), Some((ClipId(1), DragMode::Move)));
        assert_eq!(hit_test_clip(&clips, 25.0, 10.0, 8.0), None);
        // At 100 px/s handles shrink to 0.08s
        assert_eq!(hit_test_clip(&clips, 10.5, 100.0, 8.0), Some((ClipId(1), DragMode::Move)));
    }

    #[test]
    fn test_hit_test_topmost_clip_wins() {
        let clips = vec![clip(1, 0.0, 10.0, 0.0), clip(2, 5.0, 10.0, 0.0)];
        assert_eq!(hit_test_clip(&clips, 7.0, 10.0, 8.0), Some((ClipId(2), DragMode::Move)));
    }

    #[test]
    fn test_click_selects_segment_then_seeks() {
        let segments = vec![
            Segment::new(1, 0.0, 5.0, "a").unwrap(),
            Segment::new(2, 5.0, 9.0, "b").unwrap(),
        ];
        let c = ctx(&segments, &[]);
        let mut ctl = InteractionController::default();

        assert!(ctl.pointer_down(62.0, PointerTarget::SegmentTrack, &c).is_empty());
        assert!(ctl.pointer_move(63.0, &c).is_empty());
        let events = ctl.pointer_up(63.0, &c);
        assert_eq!(events, vec![TimelineEvent::SegmentClick(2), TimelineEvent::Seek(6.3)]);
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_click_seek_clamps_to_duration() {
        let c = ctx(&[], &[]);
        let mut ctl = InteractionController::default();
        ctl.pointer_down(900.0, PointerTarget::Ruler, &c);
        assert_eq!(ctl.pointer_up(900.0, &c), vec![TimelineEvent::Seek(60.0)]);
    }

    #[test]
    fn test_press_that_moves_is_not_a_click() {
        let c = ctx(&[], &[]);
        let mut ctl = InteractionController::default();
        ctl.pointer_down(100.0, PointerTarget::SegmentTrack, &c);
        assert!(ctl.pointer_move(150.0, &c).is_empty());
        assert!(ctl.pointer_move(100.0, &c).is_empty());
        assert!(ctl.pointer_up(100.0, &c).is_empty());
    }

    #[test]
    fn test_playhead_drag_uses_fresh_viewport() {
        let c = ctx(&[], &[]);
        let mut ctl = InteractionController::default();
        assert_eq!(
            ctl.pointer_down(50.0, PointerTarget::PlayheadHandle, &c),
            vec![TimelineEvent::InteractionStart]
        );
        assert_eq!(ctl.pointer_move(80.0, &c), vec![TimelineEvent::Seek(8.0)]);

        // Viewport scrolled and zoomed mid-drag
        let moved = PointerContext {
            mapper: CoordinateMapper::new(20.0, 100.0),
            ..c
        };
        assert_eq!(ctl.pointer_move(80.0, &moved), vec![TimelineEvent::Seek(9.0)]);
        assert_eq!(ctl.pointer_up(80.0, &moved), vec![TimelineEvent::InteractionEnd]);
    }

    #[test]
    fn test_drags_are_mutually_exclusive() {
        let clips = vec![clip(1, 0.0, 10.0, 0.0)];
        let c = ctx(&[], &clips);
        let mut ctl = InteractionController::default();

        ctl.pointer_down(50.0, PointerTarget::PlayheadHandle, &c);
        assert!(ctl.pointer_down(50.0, PointerTarget::AudioTrack, &c).is_empty());
        assert_eq!(ctl.gesture(), &Gesture::ScrubPlayhead);

        // No clip patches leak out of a playhead drag
        let events = ctl.pointer_move(70.0, &c);
        assert!(events.iter().all(|e| matches!(e, TimelineEvent::Seek(_))));
    }

    #[test]
    fn test_clip_move_drag() {
        let mut target = clip(1, 5.0, 10.0, 2.0);
        let clips = vec![target.clone()];
        let c = ctx(&[], &clips);
        let mut ctl = InteractionController::default();

        assert!(ctl.pointer_down(100.0, PointerTarget::AudioTrack, &c).is_empty());
        let events = ctl.pointer_move(130.0, &c);
        assert_eq!(events[0], TimelineEvent::InteractionStart);
        apply(&mut target, &events);
        assert_eq!(target.start_time, 8.0);

        // Delta is measured from the press, not the previous move
        let events = ctl.pointer_move(80.0, &c);
        apply(&mut target, &events);
        assert_eq!(target.start_time, 3.0);
        assert_eq!(target.offset, 2.0);

        assert_eq!(ctl.pointer_up(80.0, &c), vec![TimelineEvent::InteractionEnd]);
    }

    #[test]
    fn test_clip_trim_left_drag_scenario() {
        let mut target = clip(1, 5.0, 10.0, 2.0);
        let clips = vec![target.clone()];
        let c = ctx(&[], &clips);
        let mut ctl = InteractionController::default();

        ctl.pointer_down(50.0, PointerTarget::AudioTrack, &c);
        let events = ctl.pointer_move(20.0, &c);
        apply(&mut target, &events);
        assert_eq!((target.start_time, target.duration, target.offset), (3.0, 12.0, 0.0));
    }

    #[test]
    fn test_clip_click_selects_and_seeks_without_interaction_hooks() {
        let clips = vec![clip(4, 5.0, 10.0, 0.0)];
        let c = ctx(&[], &clips);
        let mut ctl = InteractionController::default();
        ctl.pointer_down(100.0, PointerTarget::AudioTrack, &c);
        assert_eq!(
            ctl.pointer_up(101.0, &c),
            vec![TimelineEvent::SelectClip(ClipId(4)), TimelineEvent::Seek(10.1)]
        );
    }

    #[test]
    fn test_linked_boundary_drag() {
        let segments = vec![
            Segment::new(1, 0.0, 5.0, "a").unwrap(),
            Segment::new(2, 5.0, 9.0, "b").unwrap(),
        ];
        let c = ctx(&segments, &[]);
        let mut ctl = InteractionController::default();
        ctl.set_mode(EditMode::LinkedRegions);

        // Just right of the shared boundary picks segment 2's start
        assert_eq!(
            ctl.pointer_down(52.0, PointerTarget::SegmentTrack, &c),
            vec![TimelineEvent::InteractionStart]
        );
        assert_eq!(
            ctl.pointer_move(60.0, &c),
            vec![TimelineEvent::MoveBoundary {
                index: 2,
                edge: BoundaryEdge::Start,
                time: 6.0
            }]
        );
        assert_eq!(ctl.pointer_up(60.0, &c), vec![TimelineEvent::InteractionEnd]);

        assert_eq!(hit_test_boundary(&segments, 4.8, 10.0, 8.0), Some((1, BoundaryEdge::End)));
        assert_eq!(hit_test_boundary(&segments, 2.5, 10.0, 8.0), None);
    }

    #[test]
    fn test_teardown_ends_live_drag() {
        let c = ctx(&[], &[]);
        let mut ctl = InteractionController::default();
        assert!(ctl.teardown().is_empty());

        ctl.pointer_down(10.0, PointerTarget::PlayheadHandle, &c);
        assert_eq!(ctl.teardown(), vec![TimelineEvent::InteractionEnd]);
        assert!(!ctl.is_active());
        assert!(ctl.pointer_move(30.0, &c).is_empty());
    }

    #[test]
    fn test_hover_cursor() {
        let clips = vec![clip(1, 10.0, 10.0, 0.0)];
        let c = ctx(&[], &clips);
        let ctl = InteractionController::default();
        assert_eq!(ctl.hover(150.0, PointerTarget::AudioTrack, &c), CursorHint::Grab);
        assert_eq!(ctl.hover(101.0, PointerTarget::AudioTrack, &c), CursorHint::ResizeHorizontal);
        assert_eq!(ctl.hover(400.0, PointerTarget::AudioTrack, &c), CursorHint::Default);
    }

    #[test]
    fn test_wheel_pans_and_zooms() {
        let ctl = InteractionController::default();
        let mut viewport = ViewportController::default();
        viewport.set_duration(120.0);
        viewport.set_viewport_width(1000.0);

        ctl.wheel(0.0, -40.0, false, 0.0, &mut viewport);
        assert_eq!(viewport.target_scroll_offset(), 40.0);

        let before = viewport.target_pixels_per_second();
        ctl.wheel(0.0, 50.0, true, 0.0, &mut viewport);
        assert!(viewport.target_pixels_per_second() > before);
    }
}
