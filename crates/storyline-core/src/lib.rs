//! storyline-core: Timeline coordinate, animation and interaction model

mod clip;
pub mod coords;
mod error;
pub mod gesture;
pub mod history;
pub mod peaks;
pub mod playhead;
pub mod region_link;
pub mod render;
pub mod ruler;
mod segment;
pub mod smoothed;
pub mod viewport;

pub use clip::{AudioClip, ClipId, ClipPatch, SourceId, MIN_CLIP_DURATION};
pub use coords::{clamp_scroll, max_scroll, CoordinateMapper};
pub use error::{Result, TimelineError};
pub use gesture::{
    apply_drag, hit_test_boundary, hit_test_clip, ClipGrab, CursorHint, DragMode, DragOrigin, EditMode,
    Gesture, InteractionConfig, InteractionController, PointerContext, PointerTarget, TimelineEvent,
};
pub use history::{Debouncer, EditHistory};
pub use peaks::{PeakData, WaveformRequest};
pub use playhead::{PlaybackTick, PlayheadState, PlayheadSync};
pub use region_link::{BoundaryEdge, RegionEditor, RegionLinkConfig};
pub use render::{
    AudioLayout, ClipBox, LayerCache, LayerKey, Rebuilt, RenderInputs, RenderPipeline, SegmentBox,
};
pub use ruler::RulerTick;
pub use segment::{find_segment_at, LinkedMedia, Segment, SegmentStatus};
pub use smoothed::SmoothedValue;
pub use viewport::{AnimationStatus, ViewportConfig, ViewportController, ZoomAnchor};
