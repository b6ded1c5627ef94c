//! storyline-services: Audio decoding and waveform peak computation

pub mod audio;
mod error;
pub mod peak_loader;
pub mod peak_provider;
pub mod peak_worker;

pub use audio::{probe_duration, read_wav_mono, to_mono, DecodedAudio};
pub use error::{PeakError, Result};
pub use peak_loader::{PeakEntry, PeakLoader};
pub use peak_provider::{compute_peaks, resolve_url, target_peak_count, LocalPeakProvider, PeakProvider};
pub use peak_worker::{PeakRequest, PeakResult, PeakWorker};
