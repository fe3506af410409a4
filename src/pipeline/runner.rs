use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, RecvTimeoutError, TryRecvError},
};
use std::thread;
use std::time::Duration;

use tracing::warn;

use super::{BangerCheck, PipelineError, SubmitError};
use crate::audio::{DecodingService, RawAudioInput};
use crate::classify::Classification;
use crate::wav::WavBytes;

/// Runs one pipeline job at a time on a background thread.
pub struct PipelineRunner<D> {
    pipeline: Arc<BangerCheck<D>>,
    in_flight: Arc<AtomicBool>,
}

impl<D> PipelineRunner<D>
where
    D: DecodingService + Send + Sync + 'static,
{
    pub fn new(pipeline: BangerCheck<D>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a submitted job has not finished yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Normalize, encode and classify `input` in the background.
    pub fn submit(&self, input: RawAudioInput) -> Result<Pending<Classification>, SubmitError> {
        self.spawn(move |pipeline| pipeline.run(input))
    }

    /// Normalize and encode `input` in the background without uploading it.
    pub fn submit_prepare(&self, input: RawAudioInput) -> Result<Pending<WavBytes>, SubmitError> {
        self.spawn(move |pipeline| pipeline.prepare(input))
    }

    /// Classify a sample produced by an earlier [`submit_prepare`](Self::submit_prepare).
    pub fn submit_wav(&self, wav: WavBytes) -> Result<Pending<Classification>, SubmitError> {
        self.spawn(move |pipeline| pipeline.classify_wav(&wav))
    }

    fn spawn<T, F>(&self, job: F) -> Result<Pending<T>, SubmitError>
    where
        T: Send + 'static,
        F: FnOnce(&BangerCheck<D>) -> Result<T, PipelineError> + Send + 'static,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::InFlight);
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let pipeline = Arc::clone(&self.pipeline);
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("bangercheck-pipeline".to_string())
            .spawn(move || {
                let _guard = guard;
                let result = job(&pipeline);
                if tx.send(result).is_err() {
                    warn!("Pipeline result dropped; the caller stopped waiting");
                }
            })
            .map_err(SubmitError::Spawn)?;
        Ok(Pending { receiver: rx })
    }
}

/// Clears the in-flight flag when the worker finishes, including by panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a background job's eventual result.
pub struct Pending<T> {
    receiver: Receiver<Result<T, PipelineError>>,
}

impl<T> Pending<T> {
    /// Block until the job finishes.
    pub fn wait(self) -> Result<T, PipelineError> {
        self.receiver
            .recv()
            .unwrap_or(Err(PipelineError::Interrupted))
    }

    /// Wait up to `timeout`; `None` means the job is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, PipelineError>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(PipelineError::Interrupted)),
        }
    }

    /// Non-blocking poll for UI loops.
    pub fn try_result(&self) -> Option<Result<T, PipelineError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PipelineError::Interrupted)),
        }
    }
}
