//! Peak computation from decoded audio, paths and `file://` URLs

use std::path::{Path, PathBuf};

use storyline_core::{PeakData, TimelineError};

use crate::audio::{read_wav_mono, DecodedAudio};
use crate::error::{PeakError, Result};

/// Produces min/max envelopes for audio sources
pub trait PeakProvider: Send {
    fn compute_peaks(&self, audio: &DecodedAudio, target_count: usize) -> Result<PeakData>;

    fn compute_peaks_from_path(&self, path: &Path, target_count: usize) -> Result<PeakData> {
        let audio = read_wav_mono(path)?;
        self.compute_peaks(&audio, target_count)
    }

    fn compute_peaks_from_url(&self, url: &str, target_count: usize) -> Result<PeakData> {
        let path = resolve_url(url)?;
        self.compute_peaks_from_path(&path, target_count)
    }
}

/// Computes peaks on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPeakProvider;

impl PeakProvider for LocalPeakProvider {
    fn compute_peaks(&self, audio: &DecodedAudio, target_count: usize) -> Result<PeakData> {
        compute_peaks(&audio.samples, audio.sample_rate, target_count)
    }
}

/// Summarise `samples` into about `target_count` min/max pairs
pub fn compute_peaks(samples: &[f32], sample_rate: u32, target_count: usize) -> Result<PeakData> {
    if target_count == 0 {
        return Err(TimelineError::InvalidSampleCount(0).into());
    }
    if samples.is_empty() {
        return Err(PeakError::EmptyAudio);
    }

    let samples_per_peak = samples.len().div_ceil(target_count).max(1);
    let (mins, maxs) = samples
        .chunks(samples_per_peak)
        .map(|chunk| {
            chunk
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)))
        })
        .unzip();

    Ok(PeakData::new(sample_rate, samples_per_peak, mins, maxs)?)
}

/// Peak count for `duration` seconds at `peaks_per_second`
pub fn target_peak_count(duration: f64, peaks_per_second: u32) -> usize {
    (duration.max(0.0) * peaks_per_second as f64).ceil().max(1.0) as usize
}

/// Local path for a `file://` URL or a plain path. Remote schemes are refused.
pub fn resolve_url(url: &str) -> Result<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        // file://localhost/path and file:///path
        let rest = rest.strip_prefix("localhost").unwrap_or(rest);
        if rest.is_empty() {
            return Err(PeakError::UnsupportedUrl(url.to_string()));
        }
        return Ok(PathBuf::from(rest));
    }
    if url.contains("://") {
        return Err(PeakError::UnsupportedUrl(url.to_string()));
    }
    Ok(PathBuf::from(url))
}
