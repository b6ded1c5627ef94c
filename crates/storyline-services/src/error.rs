//! Error types for peak computation

use storyline_core::TimelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeakError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Unsupported audio URL: {0}")]
    UnsupportedUrl(String),
    #[error("Audio contains no samples")]
    EmptyAudio,
    #[error("Peak worker disconnected")]
    WorkerDisconnected,
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

pub type Result<T> = std::result::Result<T, PeakError>;
