use egui::{Pos2, Rect, Vec2};
use storyline_core::{AudioClip, ClipId, CoordinateMapper, PlayheadSync, PointerTarget, Segment, SourceId};
use storyline_services::PeakLoader;

pub(super) const RULER_HEIGHT: f32 = 24.0;
pub(super) const SEGMENT_TRACK_HEIGHT: f32 = 56.0;
/// Half-width of the grab zone around the playhead inside the ruler
pub(super) const PLAYHEAD_GRAB_PX: f32 = 6.0;

/// Everything the timeline shows for one frame, borrowed from app state
pub struct TimelineView<'a> {
    pub segments: &'a [Segment],
    pub clips: &'a [AudioClip],
    pub peaks: &'a PeakLoader,
    /// Continuous source drawn when there are no clips
    pub legacy_source: Option<&'a SourceId>,
    pub legacy_duration: Option<f64>,
    pub duration: f64,
    pub playhead: &'a PlayheadSync,
    pub selected_segment: Option<usize>,
    pub selected_clip: Option<ClipId>,
    /// Bumped by the app whenever segments or clips change
    pub revision: u64,
}

/// Folded waveform columns for the current audio layer: one slot per clip
/// box, or a single slot for the continuous track
#[derive(Debug, Default)]
pub(super) struct WaveformCache {
    /// Audio layer generation and peak revision the columns were folded at
    pub key: Option<(u64, u64)>,
    pub columns: Vec<Option<Vec<(f32, f32)>>>,
}

impl WaveformCache {
    pub fn get(&self, slot: usize) -> Option<&[(f32, f32)]> {
        self.columns.get(slot).and_then(Option::as_deref)
    }
}

/// Shared layout for a single timeline frame.
/// Built once in `ui()`, passed by reference to drawing and input.
pub(super) struct TimelineContext {
    pub rect: Rect,
    pub ruler_rect: Rect,
    pub segment_rect: Rect,
    pub audio_rect: Rect,
    pub pixels_per_point: f32,
    /// Absolute x of the playhead, `None` while it is off-screen
    pub playhead_x: Option<f32>,
}

impl TimelineContext {
    pub fn new(rect: Rect, pixels_per_point: f32, playhead: &PlayheadSync, mapper: &CoordinateMapper) -> Self {
        let ruler_rect = Rect::from_min_size(rect.min, Vec2::new(rect.width(), RULER_HEIGHT));
        let segment_rect = Rect::from_min_size(
            egui::pos2(rect.left(), ruler_rect.bottom()),
            Vec2::new(rect.width(), SEGMENT_TRACK_HEIGHT),
        );
        let audio_rect = Rect::from_min_max(
            egui::pos2(rect.left(), segment_rect.bottom()),
            egui::pos2(rect.right(), rect.bottom().max(segment_rect.bottom())),
        );
        Self {
            rect,
            ruler_rect,
            segment_rect,
            audio_rect,
            pixels_per_point,
            playhead_x: playhead
                .pixel_position(mapper, rect.width() as f64)
                .map(|x| rect.left() + x as f32),
        }
    }

    /// Track-local x for an absolute screen position
    pub fn local_x(&self, pos: Pos2) -> f64 {
        (pos.x - self.rect.left()) as f64
    }

    pub fn width(&self) -> f64 {
        self.rect.width() as f64
    }

    /// Screen x for a track-local coordinate, snapped to a physical pixel
    pub fn screen_x(&self, local_x: f64) -> f32 {
        storyline_core::render::snap_to_device(self.rect.left() as f64 + local_x, self.pixels_per_point) as f32
    }

    pub fn target_at(&self, pos: Pos2) -> PointerTarget {
        if pos.y < self.ruler_rect.bottom() {
            let on_handle = self
                .playhead_x
                .is_some_and(|x| (pos.x - x).abs() <= PLAYHEAD_GRAB_PX);
            return if on_handle {
                PointerTarget::PlayheadHandle
            } else {
                PointerTarget::Ruler
            };
        }
        if pos.y < self.segment_rect.bottom() {
            PointerTarget::SegmentTrack
        } else {
            PointerTarget::AudioTrack
        }
    }
}
