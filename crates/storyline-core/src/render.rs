//! Layer layout for the ruler, segment track and audio track.
//!
//! Everything here is computed in track-local pixels (x = 0 is the left edge
//! of the timeline area). The GUI only offsets and paints the result.

use crate::clip::{AudioClip, ClipId, SourceId};
use crate::coords::CoordinateMapper;
use crate::peaks::WaveformRequest;
use crate::ruler::{ruler_ticks, RulerTick};
use crate::segment::Segment;

/// Horizontal padding inside a segment box
pub const SEGMENT_PADDING_PX: f64 = 6.0;
/// Space reserved on the right of a segment box for the status glyph
pub const GLYPH_RESERVE_PX: f64 = 16.0;
/// Vertical inset of clip bodies inside the audio track
pub const CLIP_INSET_PX: f32 = 4.0;

const ELLIPSIS: char = '…';
const DIVIDER_DEDUP_PX: f64 = 0.5;

/// Snap a logical coordinate to the centre of a physical pixel
pub fn snap_to_device(x: f64, pixels_per_point: f32) -> f64 {
    let ppp = pixels_per_point.max(0.1) as f64;
    ((x * ppp).floor() + 0.5) / ppp
}

/// Shrink `title` with a trailing ellipsis until `measure` says it fits
pub fn fit_title(title: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> String {
    if title.is_empty() || max_width <= 0.0 {
        return String::new();
    }
    if measure(title) <= max_width {
        return title.to_string();
    }

    let chars: Vec<char> = title.chars().collect();
    let candidate = |n: usize| -> String {
        let mut s: String = chars[..n].iter().collect();
        s.push(ELLIPSIS);
        s
    };

    // Largest prefix length whose ellipsised form still fits
    let (mut lo, mut hi) = (0usize, chars.len());
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if measure(&candidate(mid)) <= max_width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let fitted = candidate(lo);
    if measure(&fitted) <= max_width {
        fitted
    } else {
        String::new()
    }
}

/// Segments whose `[start, end)` intersects `[t0, t1)`.
///
/// Bisection needs both edges ordered, which holds for sorted, non-overlapping
/// input. Anything else (including a long segment spanning later ones) falls
/// back to a linear filter.
pub fn visible_segments(segments: &[Segment], t0: f64, t1: f64) -> Vec<&Segment> {
    let bisectable =
        segments.is_sorted_by_key(|s| s.start_time) && segments.is_sorted_by_key(|s| s.end_time);
    if bisectable {
        let first = segments.partition_point(|s| s.end_time <= t0);
        segments[first..]
            .iter()
            .take_while(|s| s.start_time < t1)
            .filter(|s| s.intersects(t0, t1))
            .collect()
    } else {
        segments.iter().filter(|s| s.intersects(t0, t1)).collect()
    }
}

/// Fingerprint of everything a layer's pixels depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerKey {
    pixels_per_second: u64,
    scroll_offset: u64,
    width: u64,
    pixels_per_point: u32,
    revision: u64,
    selection: Option<u64>,
}

impl LayerKey {
    pub fn new(mapper: &CoordinateMapper, width: f64, pixels_per_point: f32) -> Self {
        Self {
            pixels_per_second: mapper.pixels_per_second.to_bits(),
            scroll_offset: mapper.scroll_offset.to_bits(),
            width: width.to_bits(),
            pixels_per_point: pixels_per_point.to_bits(),
            revision: 0,
            selection: None,
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_selection(mut self, selection: Option<u64>) -> Self {
        self.selection = selection;
        self
    }
}

/// One layer's last layout, rebuilt only when its key changes
#[derive(Debug, Default)]
pub struct LayerCache<T> {
    key: Option<LayerKey>,
    value: T,
    rebuilds: u64,
}

impl<T: Default> LayerCache<T> {
    pub fn new() -> Self {
        Self {
            key: None,
            value: T::default(),
            rebuilds: 0,
        }
    }

    /// Rebuild when `key` differs from the cached one. Returns true on rebuild.
    pub fn refresh(&mut self, key: LayerKey, build: impl FnOnce() -> T) -> bool {
        if self.key == Some(key) {
            return false;
        }
        self.value = build();
        self.key = Some(key);
        self.rebuilds += 1;
        true
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

/// Painted segment box in track-local pixels
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBox {
    pub index: usize,
    pub x0: f64,
    pub x1: f64,
    pub selected: bool,
    pub index_label: String,
    /// Title after shrink-to-fit, possibly empty
    pub title: String,
    pub duration_label: String,
    pub glyph: &'static str,
    pub media_label: Option<String>,
}

/// Painted clip body and the waveform slice inside it
#[derive(Debug, Clone, PartialEq)]
pub struct ClipBox {
    pub id: ClipId,
    pub source: SourceId,
    pub name: String,
    pub x0: f64,
    pub x1: f64,
    pub selected: bool,
    /// Visible part of the clip, sliced from its own source range.
    /// `None` when the clip is narrower than a pixel.
    pub waveform: Option<WaveformRequest>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AudioLayout {
    #[default]
    Empty,
    Clips(Vec<ClipBox>),
    /// One continuous waveform following the viewport, with segment dividers
    Legacy {
        waveform: Option<WaveformRequest>,
        dividers: Vec<f64>,
    },
}

/// Inputs for one frame of layout
#[derive(Debug, Clone, Copy)]
pub struct RenderInputs<'a> {
    pub mapper: CoordinateMapper,
    pub width: f64,
    pub audio_track_height: f32,
    pub pixels_per_point: f32,
    pub segments: &'a [Segment],
    pub clips: &'a [AudioClip],
    /// Length of the single legacy source, used when `clips` is empty
    pub legacy_duration: Option<f64>,
    pub selected_segment: Option<usize>,
    pub selected_clip: Option<ClipId>,
    /// Bumped by the host whenever segments, clips or peaks change
    pub revision: u64,
}

/// Which layers were rebuilt this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rebuilt {
    pub ruler: bool,
    pub segments: bool,
    pub audio: bool,
}

/// Three independently cached layers
#[derive(Debug, Default)]
pub struct RenderPipeline {
    ruler: LayerCache<Vec<RulerTick>>,
    segments: LayerCache<Vec<SegmentBox>>,
    audio: LayerCache<AudioLayout>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring every layer up to date with `inputs`
    pub fn prepare(&mut self, inputs: &RenderInputs<'_>, measure: impl Fn(&str) -> f64) -> Rebuilt {
        let base = LayerKey::new(&inputs.mapper, inputs.width, inputs.pixels_per_point);

        let ruler = self
            .ruler
            .refresh(base, || ruler_ticks(&inputs.mapper, inputs.width));

        let segments = self.segments.refresh(
            base.with_revision(inputs.revision)
                .with_selection(inputs.selected_segment.map(|i| i as u64)),
            || layout_segments(inputs, &measure),
        );

        let audio = self.audio.refresh(
            base.with_revision(inputs.revision)
                .with_selection(inputs.selected_clip.map(|id| id.0)),
            || layout_audio(inputs),
        );

        Rebuilt { ruler, segments, audio }
    }

    pub fn ruler(&self) -> &[RulerTick] {
        self.ruler.value()
    }

    pub fn segments(&self) -> &[SegmentBox] {
        self.segments.value()
    }

    pub fn audio(&self) -> &AudioLayout {
        self.audio.value()
    }

    /// Changes every time the audio layer is rebuilt
    pub fn audio_generation(&self) -> u64 {
        self.audio.rebuilds()
    }

    pub fn invalidate(&mut self) {
        self.ruler.invalidate();
        self.segments.invalidate();
        self.audio.invalidate();
    }
}

fn layout_segments(inputs: &RenderInputs<'_>, measure: &impl Fn(&str) -> f64) -> Vec<SegmentBox> {
    let (t0, t1) = inputs.mapper.visible_range(inputs.width);
    visible_segments(inputs.segments, t0, t1)
        .into_iter()
        .map(|segment| {
            let x0 = inputs.mapper.time_to_pixel(segment.start_time);
            let x1 = inputs.mapper.time_to_pixel(segment.end_time);
            let title_room = (x1 - x0) - 2.0 * SEGMENT_PADDING_PX - GLYPH_RESERVE_PX;
            SegmentBox {
                index: segment.index,
                x0,
                x1,
                selected: inputs.selected_segment == Some(segment.index),
                index_label: format!("{}", segment.index),
                title: fit_title(&segment.title, title_room, measure),
                duration_label: format!("{:.1}s", segment.duration()),
                glyph: segment.status.glyph(),
                media_label: segment.media.as_ref().map(|m| m.label.clone()),
            }
        })
        .collect()
}

fn layout_audio(inputs: &RenderInputs<'_>) -> AudioLayout {
    if !inputs.clips.is_empty() {
        return AudioLayout::Clips(layout_clips(inputs));
    }
    match inputs.legacy_duration {
        Some(duration) if duration > 0.0 => layout_legacy(inputs, duration),
        _ => AudioLayout::Empty,
    }
}

fn layout_clips(inputs: &RenderInputs<'_>) -> Vec<ClipBox> {
    let mapper = &inputs.mapper;
    let mut boxes = Vec::new();

    for clip in inputs.clips {
        let x0 = mapper.time_to_pixel(clip.start_time);
        let x1 = mapper.time_to_pixel(clip.end_time());

        if x1 < 0.0 || x0 > inputs.width {
            continue;
        }

        // Only the on-screen part is sliced; source time follows offset, not placement
        let vis_x0 = x0.max(0.0);
        let vis_x1 = x1.min(inputs.width);
        let waveform = (vis_x1 - vis_x0 >= 1.0).then(|| {
            let source_start = clip.source_time_at(mapper.pixel_to_time(vis_x0));
            let source_end = clip.source_time_at(mapper.pixel_to_time(vis_x1));
            WaveformRequest {
                x: vis_x0 as f32,
                y: CLIP_INSET_PX,
                width: (vis_x1 - vis_x0) as f32,
                height: (inputs.audio_track_height - 2.0 * CLIP_INSET_PX).max(0.0),
                pixels_per_second: mapper.pixels_per_second,
                scroll_offset: mapper.scroll_offset,
                start_time: Some(source_start),
                end_time: Some(source_end),
                density: inputs.pixels_per_point,
            }
        });

        boxes.push(ClipBox {
            id: clip.id,
            source: clip.source.clone(),
            name: clip.name.clone(),
            x0,
            x1,
            selected: inputs.selected_clip == Some(clip.id),
            waveform,
        });
    }

    boxes
}

fn layout_legacy(inputs: &RenderInputs<'_>, duration: f64) -> AudioLayout {
    let mapper = &inputs.mapper;
    let end_x = mapper.time_to_pixel(duration).min(inputs.width);
    let waveform = (end_x >= 1.0).then(|| WaveformRequest {
        x: 0.0,
        y: 0.0,
        width: end_x as f32,
        height: inputs.audio_track_height,
        pixels_per_second: mapper.pixels_per_second,
        scroll_offset: mapper.scroll_offset,
        start_time: None,
        end_time: None,
        density: inputs.pixels_per_point,
    });

    let (t0, t1) = mapper.visible_range(inputs.width);
    let mut dividers: Vec<f64> = Vec::new();
    for segment in visible_segments(inputs.segments, t0, t1) {
        for time in [segment.start_time, segment.end_time] {
            let x = mapper.time_to_pixel(time);
            if !mapper.is_visible(x, inputs.width) {
                continue;
            }
            if dividers.last().is_some_and(|last| (x - last).abs() < DIVIDER_DEDUP_PX) {
                continue;
            }
            dividers.push(x);
        }
    }

    AudioLayout::Legacy { waveform, dividers }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 10px wide
    fn mono(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    fn segments() -> Vec<Segment> {
        (0..100)
            .map(|i| Segment::new(i, i as f64 * 2.0, (i + 1) as f64 * 2.0, format!("Beat {}", i)).unwrap())
            .collect()
    }

    fn inputs<'a>(segments: &'a [Segment], clips: &'a [AudioClip], mapper: CoordinateMapper) -> RenderInputs<'a> {
        RenderInputs {
            mapper,
            width: 400.0,
            audio_track_height: 60.0,
            pixels_per_point: 1.0,
            segments,
            clips,
            legacy_duration: None,
            selected_segment: None,
            selected_clip: None,
            revision: 0,
        }
    }

    #[test]
    fn test_fit_title() {
        assert_eq!(fit_title("Intro", 100.0, mono), "Intro");
        assert_eq!(fit_title("Opening scene", 60.0, mono), "Openi…");
        assert_eq!(fit_title("Opening scene", 10.0, mono), "…");
        assert_eq!(fit_title("Opening scene", 5.0, mono), "");
        assert_eq!(fit_title("", 100.0, mono), "");
    }

    #[test]
    fn test_visible_segments_skips_off_screen() {
        let segs = segments();
        let visible = visible_segments(&segs, 10.0, 15.0);
        let indices: Vec<_> = visible.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![5, 6, 7]);

        let mut shuffled = segs.clone();
        shuffled.reverse();
        let visible = visible_segments(&shuffled, 10.0, 15.0);
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn test_visible_segments_keeps_long_overlapping_span() {
        let segs = vec![
            Segment::new(1, 0.0, 100.0, "Wide").unwrap(),
            Segment::new(2, 1.0, 2.0, "Short").unwrap(),
            Segment::new(3, 3.0, 4.0, "Short").unwrap(),
        ];
        let indices: Vec<_> = visible_segments(&segs, 50.0, 60.0).iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1]);

        let indices: Vec<_> = visible_segments(&segs, 1.5, 3.5).iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_segment_layout_marks_selection() {
        let segs = segments();
        // 20 px/s, 400px wide, scrolled to 100px -> t in [5, 25)
        let mut input = inputs(&segs, &[], CoordinateMapper::new(20.0, 100.0));
        input.selected_segment = Some(3);

        let mut pipeline = RenderPipeline::new();
        pipeline.prepare(&input, mono);
        let boxes = pipeline.segments();
        assert_eq!(boxes.first().map(|b| b.index), Some(2));
        assert_eq!(boxes.last().map(|b| b.index), Some(12));
        assert!(boxes.iter().any(|b| b.index == 3 && b.selected));
        assert_eq!(boxes[1].duration_label, "2.0s");
    }

    #[test]
    fn test_layers_rebuild_only_on_key_change() {
        let segs = segments();
        let mut pipeline = RenderPipeline::new();
        let input = inputs(&segs, &[], CoordinateMapper::new(20.0, 0.0));

        let first = pipeline.prepare(&input, mono);
        assert_eq!(first, Rebuilt { ruler: true, segments: true, audio: true });
        assert_eq!(pipeline.prepare(&input, mono), Rebuilt::default());
        assert_eq!(pipeline.audio_generation(), 1);

        let selected = RenderInputs { selected_segment: Some(1), ..input };
        assert_eq!(
            pipeline.prepare(&selected, mono),
            Rebuilt { ruler: false, segments: true, audio: false }
        );

        let scrolled = RenderInputs { mapper: CoordinateMapper::new(20.0, 5.0), ..selected };
        assert_eq!(
            pipeline.prepare(&scrolled, mono),
            Rebuilt { ruler: true, segments: true, audio: true }
        );

        let revised = RenderInputs { revision: 1, ..scrolled };
        assert_eq!(
            pipeline.prepare(&revised, mono),
            Rebuilt { ruler: false, segments: true, audio: true }
        );
        assert_eq!(pipeline.audio_generation(), 3);
    }

    #[test]
    fn test_clip_waveform_follows_offset_not_placement() {
        let mut clip = AudioClip::new(ClipId(1), SourceId("a.wav".into()), 30.0, 10.0);
        clip.offset = 2.0;
        let far = AudioClip::new(ClipId(2), SourceId("a.wav".into()), 500.0, 5.0);
        let clips = vec![clip, far];

        // 10 px/s, scrolled so the clip starts at x = 50
        let input = inputs(&[], &clips, CoordinateMapper::new(10.0, 250.0));
        let mut pipeline = RenderPipeline::new();
        pipeline.prepare(&input, mono);

        let AudioLayout::Clips(boxes) = pipeline.audio() else {
            panic!("expected clip layout");
        };
        assert_eq!(boxes.len(), 1);
        let wf = boxes[0].waveform.unwrap();
        assert_eq!(wf.x, 50.0);
        assert_eq!(wf.width, 100.0);
        let (start, end) = wf.source_range();
        assert!((start - 2.0).abs() < 1e-9);
        assert!((end - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_partially_visible_clip_slices_visible_part() {
        let mut clip = AudioClip::new(ClipId(1), SourceId("a.wav".into()), 0.0, 10.0);
        clip.offset = 1.0;
        let clips = vec![clip];
        // Window starts 4s into the clip
        let input = inputs(&[], &clips, CoordinateMapper::new(10.0, 40.0));
        let mut pipeline = RenderPipeline::new();
        pipeline.prepare(&input, mono);

        let AudioLayout::Clips(boxes) = pipeline.audio() else {
            panic!("expected clip layout");
        };
        assert_eq!(boxes[0].x0, -40.0);
        let (start, end) = boxes[0].waveform.unwrap().source_range();
        assert!((start - 5.0).abs() < 1e-9);
        assert!((end - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_legacy_mode_without_clips() {
        let segs = segments();
        let mut input = inputs(&segs, &[], CoordinateMapper::new(10.0, 0.0));
        input.legacy_duration = Some(30.0);
        let mut pipeline = RenderPipeline::new();
        pipeline.prepare(&input, mono);

        let AudioLayout::Legacy { waveform, dividers } = pipeline.audio() else {
            panic!("expected legacy layout");
        };
        let wf = waveform.unwrap();
        assert_eq!(wf.width, 300.0);
        assert_eq!(wf.start_time, None);
        // Boundaries every 2s = 20px across 400px, deduplicated
        assert_eq!(dividers.len(), 21);
        assert!(dividers.windows(2).all(|w| w[1] > w[0]));

        let none = RenderInputs { legacy_duration: None, ..input };
        let mut pipeline = RenderPipeline::new();
        pipeline.prepare(&none, mono);
        assert_eq!(pipeline.audio(), &AudioLayout::Empty);
    }

    #[test]
    fn test_snap_to_device() {
        assert_eq!(snap_to_device(10.2, 1.0), 10.5);
        assert_eq!(snap_to_device(10.2, 2.0), 10.25);
    }
}
