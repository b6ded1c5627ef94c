//! Script/video segments shown on the segment track

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Production state of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    #[default]
    Pending,
    Generating,
    Ready,
    Failed,
}

impl SegmentStatus {
    /// Single-character glyph drawn in the segment corner
    pub fn glyph(self) -> &'static str {
        match self {
            SegmentStatus::Pending => "○",
            SegmentStatus::Generating => "◐",
            SegmentStatus::Ready => "●",
            SegmentStatus::Failed => "✕",
        }
    }
}

/// Media attached to a segment (e.g. a chosen stock clip)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedMedia {
    pub label: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// A fixed logical block of the project, addressed by `index`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: SegmentStatus,
    #[serde(default)]
    pub media: Option<LinkedMedia>,
}

impl Segment {
    pub fn new(index: usize, start_time: f64, end_time: f64, title: impl Into<String>) -> Result<Self> {
        let segment = Self {
            index,
            start_time,
            end_time,
            title: title.into(),
            status: SegmentStatus::default(),
            media: None,
        };
        segment.validate()?;
        Ok(segment)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.end_time > self.start_time) || self.start_time < 0.0 {
            return Err(TimelineError::InvalidSegmentBounds {
                index: self.index,
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Half-open containment: `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time
    }

    pub fn intersects(&self, start: f64, end: f64) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// Find the segment whose `[start, end)` range contains `time`
pub fn find_segment_at(segments: &[Segment], time: f64) -> Option<&Segment> {
    segments.iter().find(|s| s.contains(time))
}
