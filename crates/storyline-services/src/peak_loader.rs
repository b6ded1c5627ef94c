//! Per-source peak cache with one in-flight computation per source.
//!
//! Work goes to the [`PeakWorker`] when one is available. A failed or
//! undeliverable job is retried once on the calling thread; if that fails too
//! the source is marked failed and drawn without a waveform.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use storyline_core::{PeakData, SourceId};
use tracing::{error, info, warn};

use crate::audio::read_wav_mono;
use crate::error::{PeakError, Result};
use crate::peak_provider::{target_peak_count, LocalPeakProvider, PeakProvider};
use crate::peak_worker::{PeakRequest, PeakWorker};

#[derive(Debug, Clone)]
pub enum PeakEntry {
    Ready(Arc<PeakData>),
    Failed,
}

pub struct PeakLoader {
    worker: Option<PeakWorker>,
    provider: LocalPeakProvider,
    peaks_per_second: u32,
    in_flight: HashMap<SourceId, PeakRequest>,
    cache: HashMap<SourceId, PeakEntry>,
    /// Bumped whenever an entry lands, so renderers know to rebuild
    revision: u64,
}

impl PeakLoader {
    /// Loader backed by a background worker, falling back to synchronous
    /// computation if the thread cannot be started
    pub fn new(peaks_per_second: u32) -> Self {
        let worker = match PeakWorker::spawn() {
            Ok(worker) => Some(worker),
            Err(e) => {
                warn!(error = %e, "Peak worker unavailable, computing on the UI thread");
                None
            }
        };
        Self::with_worker(worker, peaks_per_second)
    }

    pub fn with_worker(worker: Option<PeakWorker>, peaks_per_second: u32) -> Self {
        Self {
            worker,
            provider: LocalPeakProvider,
            peaks_per_second: peaks_per_second.max(1),
            in_flight: HashMap::new(),
            cache: HashMap::new(),
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, source: &SourceId) -> Option<&PeakData> {
        match self.cache.get(source) {
            Some(PeakEntry::Ready(peaks)) => Some(peaks.as_ref()),
            _ => None,
        }
    }

    pub fn entry(&self, source: &SourceId) -> Option<&PeakEntry> {
        self.cache.get(source)
    }

    pub fn is_loading(&self, source: &SourceId) -> bool {
        self.in_flight.contains_key(source)
    }

    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Start computing peaks for `source`. Returns false when the source is
    /// already cached or in flight.
    pub fn request(&mut self, source: SourceId, path: PathBuf) -> bool {
        if self.cache.contains_key(&source) || self.in_flight.contains_key(&source) {
            return false;
        }

        let request = PeakRequest {
            source: source.clone(),
            path,
            peaks_per_second: self.peaks_per_second,
        };

        let submitted = match &self.worker {
            Some(worker) => match worker.submit(request.clone()) {
                Ok(()) => true,
                Err(e) => {
                    warn!(source = %source, error = %e, "Peak worker rejected job");
                    false
                }
            },
            None => false,
        };

        if submitted {
            self.in_flight.insert(source, request);
        } else {
            self.compute_inline(&request);
        }
        true
    }

    /// Store peaks computed elsewhere
    pub fn insert(&mut self, source: SourceId, peaks: PeakData) {
        self.in_flight.remove(&source);
        self.cache.insert(source, PeakEntry::Ready(Arc::new(peaks)));
        self.revision += 1;
    }

    /// Forget a source so the next request recomputes it
    pub fn evict(&mut self, source: &SourceId) {
        if self.cache.remove(source).is_some() {
            self.revision += 1;
        }
    }

    /// Collect finished worker jobs. Returns true if any entry changed.
    ///
    /// If the worker thread has died, it is dropped and everything still in
    /// flight is computed on the calling thread.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            let received = match &self.worker {
                Some(worker) => worker.try_recv(),
                None => break,
            };
            let result = match received {
                Ok(Some(result)) => result,
                Ok(None) => break,
                Err(e) => {
                    changed |= self.recover_from_lost_worker(&e);
                    break;
                }
            };
            let Some(request) = self.in_flight.remove(&result.source) else {
                continue;
            };
            match result.peaks {
                Ok(peaks) => {
                    info!(source = %result.source, peaks = peaks.len(), "Peaks ready");
                    self.cache.insert(result.source, PeakEntry::Ready(Arc::new(peaks)));
                    self.revision += 1;
                }
                Err(e) => {
                    warn!(source = %result.source, error = %e, "Peak worker failed, retrying inline");
                    self.compute_inline(&request);
                }
            }
            changed = true;
        }
        changed
    }

    fn recover_from_lost_worker(&mut self, cause: &PeakError) -> bool {
        self.worker = None;
        let orphaned: Vec<PeakRequest> = self.in_flight.drain().map(|(_, request)| request).collect();
        warn!(error = %cause, jobs = orphaned.len(), "Peak worker lost, finishing jobs inline");
        for request in &orphaned {
            self.compute_inline(request);
        }
        !orphaned.is_empty()
    }

    fn compute_inline(&mut self, request: &PeakRequest) {
        let entry = match self.compute_sync(request) {
            Ok(peaks) => PeakEntry::Ready(Arc::new(peaks)),
            Err(e) => {
                error!(source = %request.source, error = %e, "Peak computation failed");
                PeakEntry::Failed
            }
        };
        self.cache.insert(request.source.clone(), entry);
        self.revision += 1;
    }

    fn compute_sync(&self, request: &PeakRequest) -> Result<PeakData> {
        let audio = read_wav_mono(&request.path)?;
        let target = target_peak_count(audio.duration(), request.peaks_per_second);
        self.provider.compute_peaks(&audio, target)
    }
}
