//! Error types for storyline

use thiserror::Error;

use crate::clip::ClipId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("Invalid time range: {start}..{end}")]
    InvalidTimeRange { start: f64, end: f64 },
    #[error("Invalid sample count: {0}")]
    InvalidSampleCount(usize),
    #[error("Segment {index} has invalid bounds {start}..{end}")]
    InvalidSegmentBounds { index: usize, start: f64, end: f64 },
    #[error("Segment not found: {0}")]
    SegmentNotFound(usize),
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
