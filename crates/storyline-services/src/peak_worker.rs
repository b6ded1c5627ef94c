//! Background thread that decodes audio and computes peaks off the UI thread

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use storyline_core::{PeakData, SourceId};
use tracing::{debug, error, info};

use crate::audio::read_wav_mono;
use crate::error::{PeakError, Result};
use crate::peak_provider::{target_peak_count, LocalPeakProvider, PeakProvider};

const QUEUE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct PeakRequest {
    pub source: SourceId,
    pub path: PathBuf,
    pub peaks_per_second: u32,
}

#[derive(Debug)]
pub struct PeakResult {
    pub source: SourceId,
    pub peaks: Result<PeakData>,
}

pub struct PeakWorker {
    tx: Option<Sender<PeakRequest>>,
    rx: Receiver<PeakResult>,
    _handle: JoinHandle<()>,
}

impl PeakWorker {
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(Self::worker_loop)
    }

    pub(crate) fn spawn_with<F>(body: F) -> Result<Self>
    where
        F: FnOnce(Receiver<PeakRequest>, Sender<PeakResult>) + Send + 'static,
    {
        let (request_tx, request_rx) = bounded::<PeakRequest>(QUEUE_DEPTH);
        let (result_tx, result_rx) = bounded::<PeakResult>(QUEUE_DEPTH);

        let handle = thread::Builder::new()
            .name("peak-worker".to_string())
            .spawn(move || body(request_rx, result_tx))?;

        info!("Peak worker started");
        Ok(Self {
            tx: Some(request_tx),
            rx: result_rx,
            _handle: handle,
        })
    }

    /// Queue a request without blocking
    pub fn submit(&self, request: PeakRequest) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(PeakError::WorkerDisconnected)?;
        tx.try_send(request).map_err(|_| PeakError::WorkerDisconnected)
    }

    /// Next finished computation, if any. Fails once the thread is gone and
    /// every result it sent has been received.
    pub fn try_recv(&self) -> Result<Option<PeakResult>> {
        match self.rx.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                error!("Peak worker disconnected unexpectedly");
                Err(PeakError::WorkerDisconnected)
            }
        }
    }

    fn worker_loop(rx: Receiver<PeakRequest>, tx: Sender<PeakResult>) {
        let provider = LocalPeakProvider;
        while let Ok(request) = rx.recv() {
            let started = std::time::Instant::now();
            let peaks = read_wav_mono(&request.path).and_then(|audio| {
                let target = target_peak_count(audio.duration(), request.peaks_per_second);
                provider.compute_peaks(&audio, target)
            });
            debug!(
                source = %request.source,
                ok = peaks.is_ok(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Peaks computed"
            );
            if tx
                .send(PeakResult {
                    source: request.source,
                    peaks,
                })
                .is_err()
            {
                break;
            }
        }
        debug!("Peak worker exiting");
    }
}

impl Drop for PeakWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the loop once the queue drains.
        // Not joined: a decode in progress must not block the UI thread.
        self.tx.take();
        info!("Peak worker stopped");
    }
}
