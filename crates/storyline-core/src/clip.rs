//! Placed, trimmable audio clips

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shortest visible length a clip can be trimmed to, in seconds
pub const MIN_CLIP_DURATION: f64 = 0.1;

/// Unique identifier for clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of the source audio a clip plays from (peak data is cached per source)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Audio clip on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub id: ClipId,
    pub source: SourceId,
    /// Position on the timeline in seconds
    pub start_time: f64,
    /// Visible length in seconds
    pub duration: f64,
    /// Trim-in point into the source audio in seconds
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub name: String,
}

impl AudioClip {
    pub fn new(id: ClipId, source: SourceId, start_time: f64, duration: f64) -> Self {
        Self {
            id,
            source,
            start_time: start_time.max(0.0),
            duration: duration.max(MIN_CLIP_DURATION),
            offset: 0.0,
            name: String::new(),
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Source-audio range this clip shows: `(offset, offset + duration)`
    pub fn source_range(&self) -> (f64, f64) {
        (self.offset, self.offset + self.duration)
    }

    /// Map a timeline time to a time inside the source audio
    pub fn source_time_at(&self, timeline_time: f64) -> f64 {
        self.offset + (timeline_time - self.start_time)
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time()
    }

    pub fn apply(&mut self, patch: &ClipPatch) {
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(offset) = patch.offset {
            self.offset = offset;
        }
    }
}

/// Partial clip update proposed to the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipPatch {
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub offset: Option<f64>,
}

impl ClipPatch {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.duration.is_none() && self.offset.is_none()
    }
}
