//! WAV decoding to mono f32

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::{PeakError, Result};

/// Mono samples and their rate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Read a WAV file and fold it to mono
pub fn read_wav_mono(path: &Path) -> Result<DecodedAudio> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if interleaved.is_empty() {
        return Err(PeakError::EmptyAudio);
    }

    Ok(DecodedAudio {
        samples: to_mono(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

/// Length in seconds from the header alone
pub fn probe_duration(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path)?;
    let rate = reader.spec().sample_rate;
    if rate == 0 {
        return Err(PeakError::EmptyAudio);
    }
    Ok(reader.duration() as f64 / rate as f64)
}

/// Convert interleaved samples to mono by averaging channels.
pub fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|ch| ch.iter().sum::<f32>() / channels as f32)
        .collect()
}
