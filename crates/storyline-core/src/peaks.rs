//! Min/max amplitude envelopes and waveform slicing

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

const INDEX_EPSILON: f64 = 1e-9;

/// Downsampled min/max envelope of one audio source.
///
/// Indexed by *source* time, so any `(offset, offset + duration)` window can be
/// read without knowing where a clip sits on the timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeakData {
    pub sample_rate: u32,
    /// Source frames summarised by each min/max pair
    pub samples_per_peak: usize,
    pub mins: Vec<f32>,
    pub maxs: Vec<f32>,
}

impl PeakData {
    pub fn new(sample_rate: u32, samples_per_peak: usize, mins: Vec<f32>, maxs: Vec<f32>) -> Result<Self> {
        if samples_per_peak == 0 || sample_rate == 0 {
            return Err(TimelineError::InvalidSampleCount(samples_per_peak));
        }
        if mins.len() != maxs.len() {
            return Err(TimelineError::InvalidSampleCount(mins.len().min(maxs.len())));
        }
        Ok(Self {
            sample_rate,
            samples_per_peak,
            mins,
            maxs,
        })
    }

    pub fn len(&self) -> usize {
        self.mins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mins.is_empty()
    }

    pub fn peaks_per_second(&self) -> f64 {
        self.sample_rate as f64 / self.samples_per_peak.max(1) as f64
    }

    /// Length of the summarised source in seconds
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.peaks_per_second()
    }

    /// Resample `[start, end)` (source seconds) into `count` min/max columns.
    ///
    /// Columns past the end of the source are silent `(0.0, 0.0)`.
    pub fn columns(&self, start: f64, end: f64, count: usize) -> Result<Vec<(f32, f32)>> {
        check_range(start, end)?;
        if count == 0 {
            return Err(TimelineError::InvalidSampleCount(count));
        }
        let span = end - start;
        let columns = (0..count)
            .map(|i| {
                let t0 = start + span * i as f64 / count as f64;
                let t1 = start + span * (i + 1) as f64 / count as f64;
                self.fold(self.index_range(t0, t1))
            })
            .collect();
        Ok(columns)
    }

    fn index_range(&self, start: f64, end: f64) -> (usize, usize) {
        let pps = self.peaks_per_second();
        // Tolerance keeps column edges that land on a peak boundary from spilling into the next peak
        let first = (start.max(0.0) * pps + INDEX_EPSILON).floor() as usize;
        let last = ((end.max(0.0) * pps - INDEX_EPSILON).ceil() as usize).max(first + 1);
        (first.min(self.len()), last.min(self.len()))
    }

    fn fold(&self, (first, last): (usize, usize)) -> (f32, f32) {
        if first >= last {
            return (0.0, 0.0);
        }
        let min = self.mins[first..last].iter().copied().fold(f32::MAX, f32::min);
        let max = self.maxs[first..last].iter().copied().fold(f32::MIN, f32::max);
        (min, max)
    }
}

/// Where and what to paint for one waveform slice.
///
/// With `start_time`/`end_time` set, that source range is stretched over the
/// rectangle (per-clip slicing). Otherwise the rectangle shows whatever the
/// viewport's `scroll_offset`/`pixels_per_second` put under it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformRequest {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub pixels_per_second: f64,
    pub scroll_offset: f64,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    /// Physical pixels per logical pixel
    pub density: f32,
}

impl WaveformRequest {
    pub fn source_range(&self) -> (f64, f64) {
        let start = self
            .start_time
            .unwrap_or((self.x as f64 + self.scroll_offset) / self.pixels_per_second);
        let end = self
            .end_time
            .unwrap_or(start + self.width as f64 / self.pixels_per_second);
        (start, end)
    }

    /// One column per physical pixel
    pub fn column_count(&self) -> usize {
        (self.width * self.density.max(1.0)).ceil().max(1.0) as usize
    }

    pub fn columns(&self, peaks: &PeakData) -> Result<Vec<(f32, f32)>> {
        let (start, end) = self.source_range();
        peaks.columns(start, end, self.column_count())
    }
}

fn check_range(start: f64, end: f64) -> Result<()> {
    if !(end > start) || !start.is_finite() || !end.is_finite() {
        return Err(TimelineError::InvalidTimeRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 peaks per second, ramp from 0.0 to 0.9 and back as negative mins
    fn ramp() -> PeakData {
        let maxs: Vec<f32> = (0..100).map(|i| (i % 10) as f32 / 10.0).collect();
        let mins: Vec<f32> = maxs.iter().map(|v| -v).collect();
        PeakData::new(1000, 100, mins, maxs).unwrap()
    }

    #[test]
    fn test_duration() {
        assert!((ramp().duration() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_range_fails_fast() {
        let peaks = ramp();
        assert!(matches!(peaks.columns(2.0, 2.0, 10), Err(TimelineError::InvalidTimeRange { .. })));
        assert!(matches!(peaks.columns(3.0, 2.0, 10), Err(TimelineError::InvalidTimeRange { .. })));
        assert!(matches!(peaks.columns(0.0, 1.0, 0), Err(TimelineError::InvalidSampleCount(0))));
        assert!(peaks.columns(f64::NAN, 1.0, 4).is_err());
    }

    #[test]
    fn test_columns_fold_min_max() {
        let peaks = ramp();
        let cols = peaks.columns(0.0, 1.0, 2).unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], (-0.4, 0.4));
        assert_eq!(cols[1], (-0.9, 0.9));
    }

    #[test]
    fn test_columns_past_end_are_silent() {
        let peaks = ramp();
        let cols = peaks.columns(9.5, 10.5, 2).unwrap();
        assert_eq!(cols[0], (-0.9, 0.9));
        assert_eq!(cols[1], (0.0, 0.0));
    }

    #[test]
    fn test_request_slices_explicit_source_range() {
        let peaks = ramp();
        let req = WaveformRequest {
            x: 300.0,
            y: 0.0,
            width: 4.0,
            height: 40.0,
            pixels_per_second: 100.0,
            scroll_offset: 0.0,
            start_time: Some(0.0),
            end_time: Some(0.4),
            density: 1.0,
        };
        assert_eq!(req.source_range(), (0.0, 0.4));
        let cols = req.columns(&peaks).unwrap();
        assert_eq!(cols, vec![(0.0, 0.0), (-0.1, 0.1), (-0.2, 0.2), (-0.3, 0.3)]);
    }

    #[test]
    fn test_request_follows_viewport_without_range() {
        let req = WaveformRequest {
            x: 0.0,
            y: 0.0,
            width: 500.0,
            height: 40.0,
            pixels_per_second: 50.0,
            scroll_offset: 250.0,
            start_time: None,
            end_time: None,
            density: 2.0,
        };
        assert_eq!(req.source_range(), (5.0, 15.0));
        assert_eq!(req.column_count(), 1000);
    }
}
