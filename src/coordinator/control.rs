//! Capture coordinator: device lifecycle and armed gating.

use super::pipeline::{FramePipeline, PipelineStats};
use super::session::CaptureSession;
use super::worker::{DeviceWorker, Job};
use super::FrameSink;
use crate::capture::{CaptureConfig, DeviceProvider, SurfaceInfo};
use crate::consumer::SampleSender;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Externally visible coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No open has been attempted yet.
    Idle,
    /// An open is running on the device worker.
    Opening,
    /// Device open, frames are dropped.
    Disarmed,
    /// Device open, frames are converted and sampled.
    Armed,
    /// Device closed or unavailable. Can be reopened.
    Closed,
}

/// Result of an open request, observed once by every requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Device held and preview running.
    Opened,
    /// Device held, but the preview could not be started.
    PreviewSetupFailed(String),
    /// Device could not be acquired.
    Unavailable(String),
}

impl OpenOutcome {
    /// True if the device handle is held.
    pub fn is_open(&self) -> bool {
        !matches!(self, OpenOutcome::Unavailable(_))
    }
}

/// Combined counters for one coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Frame path counters.
    pub pipeline: PipelineStats,
    /// Open attempts submitted to the device worker.
    pub open_attempts: u64,
    /// Attempts that ended with the camera unavailable.
    pub open_failures: u64,
    /// Armed flag at the time of the snapshot.
    pub armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Opening,
    Live,
    Closed,
}

struct CoordinatorState<P: DeviceProvider> {
    phase: Phase,
    session: Option<CaptureSession<P::Device>>,
    surface: Option<SurfaceInfo>,
    attempts_started: u64,
    attempts_completed: u64,
    last_outcome: OpenOutcome,
}

struct Inner<P: DeviceProvider> {
    provider: P,
    config: CaptureConfig,
    pipeline: Arc<FramePipeline>,
    state: Mutex<CoordinatorState<P>>,
    transition: Condvar,
    worker: Mutex<Option<DeviceWorker>>,
    open_failures: AtomicU64,
}

/// Owns the camera session and hands frames to the sampling pipeline.
///
/// Opening and closing run on a dedicated `capture-device` thread while
/// the caller blocks until the operation has finished. Clones share the
/// same device.
pub struct CaptureCoordinator<P: DeviceProvider> {
    inner: Arc<Inner<P>>,
}

impl<P: DeviceProvider> Clone for CaptureCoordinator<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: DeviceProvider> CaptureCoordinator<P> {
    /// Creates a coordinator publishing samples to `samples`.
    pub fn new(provider: P, config: CaptureConfig, samples: SampleSender) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                pipeline: Arc::new(FramePipeline::new(samples)),
                state: Mutex::new(CoordinatorState {
                    phase: Phase::Idle,
                    session: None,
                    surface: None,
                    attempts_started: 0,
                    attempts_completed: 0,
                    last_outcome: OpenOutcome::Unavailable("device never opened".to_string()),
                }),
                transition: Condvar::new(),
                worker: Mutex::new(None),
                open_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Sets the display target used by the next open.
    pub fn attach_surface(&self, surface: SurfaceInfo) {
        self.inner.lock_state().surface = Some(surface);
    }

    /// Forgets the display target.
    pub fn detach_surface(&self) {
        self.inner.lock_state().surface = None;
    }

    /// Opens the camera on the device worker and waits for the result.
    ///
    /// Returns the current outcome without reopening if the device is
    /// already held. Callers arriving while an open is in flight wait for
    /// that same attempt instead of starting another one.
    pub fn open_device(&self) -> OpenOutcome {
        let inner = &self.inner;
        let mut state = inner.lock_state();

        match state.phase {
            Phase::Live => return state.last_outcome.clone(),
            Phase::Opening => {
                let attempt = state.attempts_started;
                return inner.await_attempt(state, attempt);
            }
            Phase::Idle | Phase::Closed => {}
        }

        state.phase = Phase::Opening;
        state.attempts_started += 1;
        let attempt = state.attempts_started;
        drop(state);

        tracing::debug!(attempt, "submitting device open");
        let completion = AttemptCompletion {
            inner: Arc::clone(inner),
            attempt,
            done: false,
        };
        // A job that never runs completes the attempt when it is dropped.
        let _ = inner.submit(Box::new(move || completion.run()));

        let state = inner.lock_state();
        inner.await_attempt(state, attempt)
    }

    /// Stops the preview and releases the device.
    ///
    /// Safe to call repeatedly and before any open.
    pub fn close_device(&self) {
        let inner = &self.inner;
        let mut state = inner.lock_state();
        while state.phase == Phase::Opening {
            state = inner
                .transition
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let Some(session) = state.session.take() else {
            tracing::debug!("close requested with no open device");
            return;
        };
        state.phase = Phase::Closed;

        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        let job: Job = Box::new(move || {
            session.shutdown();
            let _ = done_tx.send(());
        });

        // Queued under the state lock so a later open lands behind the
        // release on the worker. Lock order is state, then worker.
        match inner.submit(job) {
            Ok(()) => {
                drop(state);
                // A disconnect means the job panicked; the session was
                // dropped during unwinding, which releases the device too.
                let _ = done_rx.recv();
            }
            Err(job) => {
                job();
                drop(state);
            }
        }
    }

    /// Stops the preview, re-registers the display target and restarts.
    ///
    /// The armed flag is left as it was. A resize arriving during an open
    /// waits for it, then restarts the new session on `surface`.
    pub fn resize_preview(&self, surface: SurfaceInfo) {
        let mut state = self.inner.lock_state();
        while state.phase == Phase::Opening {
            state = self
                .inner
                .transition
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.surface = Some(surface);

        let Some(session) = state.session.as_mut() else {
            return;
        };
        match session.resize(surface) {
            Ok(()) => tracing::debug!(
                width = surface.width,
                height = surface.height,
                "preview restarted"
            ),
            Err(e) => tracing::warn!(error = %e, "failed to restart preview"),
        }
    }

    /// Starts converting and publishing frames.
    pub fn arm(&self) {
        self.inner.pipeline.set_armed(true);
        tracing::info!("capture armed");
    }

    /// Stops publishing. A frame already being converted still completes.
    pub fn disarm(&self) {
        self.inner.pipeline.set_armed(false);
        tracing::info!("capture disarmed");
    }

    /// True while frames are being converted.
    pub fn is_armed(&self) -> bool {
        self.inner.pipeline.is_armed()
    }

    /// Current lifecycle state, with the armed flag folded in.
    pub fn state(&self) -> CaptureState {
        match self.inner.lock_state().phase {
            Phase::Idle => CaptureState::Idle,
            Phase::Opening => CaptureState::Opening,
            Phase::Live if self.is_armed() => CaptureState::Armed,
            Phase::Live => CaptureState::Disarmed,
            Phase::Closed => CaptureState::Closed,
        }
    }

    /// Returns true while the device handle is held.
    pub fn is_open(&self) -> bool {
        self.inner.lock_state().session.is_some()
    }

    /// Returns a frame callback wired to this coordinator's pipeline.
    pub fn frame_sink(&self) -> FrameSink {
        FrameSink::new(Arc::clone(&self.inner.pipeline))
    }

    /// Pipeline and device counters.
    pub fn stats(&self) -> CaptureStats {
        let attempts = self.inner.lock_state().attempts_started;
        CaptureStats {
            pipeline: self.inner.pipeline.stats(),
            open_attempts: attempts,
            open_failures: self.inner.open_failures.load(Ordering::Relaxed),
            armed: self.is_armed(),
        }
    }
}

impl<P: DeviceProvider> Inner<P> {
    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a job on the device worker, starting a new worker if there is
    /// none or the previous one died.
    fn submit(&self, job: Job) -> Result<(), Job> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        let job = match worker.as_ref() {
            Some(running) => match running.submit(job) {
                Ok(()) => return Ok(()),
                Err(job) => {
                    tracing::warn!("capture device worker exited, restarting");
                    job
                }
            },
            None => job,
        };

        match DeviceWorker::spawn() {
            Ok(fresh) => {
                let result = fresh.submit(job);
                *worker = Some(fresh);
                result
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to start capture device worker");
                Err(job)
            }
        }
    }

    fn await_attempt(
        &self,
        mut state: MutexGuard<'_, CoordinatorState<P>>,
        attempt: u64,
    ) -> OpenOutcome {
        while state.attempts_completed < attempt {
            state = self
                .transition
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.last_outcome.clone()
    }

    fn complete_attempt(
        &self,
        state: &mut CoordinatorState<P>,
        attempt: u64,
        session: Option<CaptureSession<P::Device>>,
        outcome: OpenOutcome,
    ) {
        state.phase = if session.is_some() {
            Phase::Live
        } else {
            Phase::Closed
        };
        state.session = session;
        state.attempts_completed = attempt;
        state.last_outcome = outcome.clone();
        self.transition.notify_all();

        if let OpenOutcome::Unavailable(reason) = outcome {
            self.open_failures.fetch_add(1, Ordering::Relaxed);
            self.pipeline.notify_unavailable(&reason);
        }
    }
}

/// Open job for one attempt.
///
/// Completes the attempt on every exit path: normal return, acquisition
/// failure, unwinding out of a panicking driver, or the job being dropped
/// unrun by a dead worker.
struct AttemptCompletion<P: DeviceProvider> {
    inner: Arc<Inner<P>>,
    attempt: u64,
    done: bool,
}

impl<P: DeviceProvider> AttemptCompletion<P> {
    fn run(mut self) {
        let inner = Arc::clone(&self.inner);
        let attempt = self.attempt;

        let device = match inner.provider.acquire(&inner.config) {
            Ok(device) => device,
            Err(e) => {
                tracing::warn!(attempt, error = %e, "camera unavailable");
                self.finish(None, OpenOutcome::Unavailable(e.to_string()));
                return;
            }
        };

        let surface = inner.lock_state().surface;
        let mut session = CaptureSession::new(device, inner.config.display_orientation, surface);
        let outcome = match session.start(FrameSink::new(Arc::clone(&inner.pipeline))) {
            Ok(()) => {
                let (width, height) = session.preview_size();
                tracing::info!(attempt, width, height, "camera opened, preview running");
                OpenOutcome::Opened
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "camera opened but preview setup failed");
                session.stop_preview();
                OpenOutcome::PreviewSetupFailed(e.to_string())
            }
        };
        self.finish(Some(session), outcome);
    }

    fn finish(&mut self, session: Option<CaptureSession<P::Device>>, outcome: OpenOutcome) {
        self.done = true;
        let mut state = self.inner.lock_state();
        self.inner
            .complete_attempt(&mut state, self.attempt, session, outcome);
    }
}

impl<P: DeviceProvider> Drop for AttemptCompletion<P> {
    fn drop(&mut self) {
        if !self.done {
            tracing::error!(attempt = self.attempt, "device open aborted");
            self.finish(None, OpenOutcome::Unavailable("device open aborted".to_string()));
        }
    }
}

impl<P: DeviceProvider> Drop for Inner<P> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = state.session.take() {
            session.shutdown();
        }
    }
}
