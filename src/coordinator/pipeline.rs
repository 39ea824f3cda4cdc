//! Per-frame path run on the device callback thread.

use crate::capture::{FrameError, RawFrame};
use crate::consumer::SampleSender;
use crate::conversion::{center_sample, decode_nv21};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the frame path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames delivered by the device.
    pub frames_received: u64,
    /// Frames discarded because the pipeline was disarmed.
    pub frames_dropped: u64,
    /// Frames run through the converter.
    pub frames_converted: u64,
    /// Frames rejected for inconsistent size.
    pub malformed_frames: u64,
    /// Samples handed to the consumer.
    pub samples_published: u64,
}

pub(crate) struct FramePipeline {
    armed: AtomicBool,
    samples: SampleSender,
    frames_received: AtomicU64,
    frames_dropped: AtomicU64,
    frames_converted: AtomicU64,
    malformed_frames: AtomicU64,
    samples_published: AtomicU64,
}

impl FramePipeline {
    pub(crate) fn new(samples: SampleSender) -> Self {
        Self {
            armed: AtomicBool::new(false),
            samples,
            frames_received: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            frames_converted: AtomicU64::new(0),
            malformed_frames: AtomicU64::new(0),
            samples_published: AtomicU64::new(0),
        }
    }

    pub(crate) fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::Release);
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub(crate) fn notify_unavailable(&self, reason: &str) {
        if !self.samples.send_unavailable(reason) {
            tracing::debug!("no consumer for unavailable notification");
        }
    }

    fn process(&self, data: &[u8], width: u32, height: u32) -> Result<(), FrameError> {
        self.frames_received.fetch_add(1, Ordering::Relaxed);

        if !self.is_armed() {
            self.frames_dropped.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let frame = RawFrame::new(data, width, height).map_err(|e| {
            self.malformed_frames.fetch_add(1, Ordering::Relaxed);
            tracing::error!(error = %e, "rejecting malformed frame");
            e
        })?;

        let rgb = decode_nv21(&frame);
        self.frames_converted.fetch_add(1, Ordering::Relaxed);
        let sample = center_sample(&rgb)?;

        if self.samples.send_sample(sample) {
            self.samples_published.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::trace!("consumer gone, sample discarded");
        }
        Ok(())
    }

    pub(crate) fn stats(&self) -> PipelineStats {
        PipelineStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_converted: self.frames_converted.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            samples_published: self.samples_published.load(Ordering::Relaxed),
        }
    }
}

/// Frame callback handed to the capture device.
///
/// Cheap to clone. Each call runs conversion synchronously on the calling
/// thread and posts the resulting sample without waiting for the consumer.
#[derive(Clone)]
pub struct FrameSink {
    pipeline: Arc<FramePipeline>,
}

impl FrameSink {
    pub(crate) fn new(pipeline: Arc<FramePipeline>) -> Self {
        Self { pipeline }
    }

    /// Handles one raw NV21 frame.
    ///
    /// Disarmed frames are dropped without touching the buffer. An armed
    /// frame whose length does not match `width` x `height` is rejected
    /// and produces no sample.
    pub fn on_frame(&self, data: &[u8], width: u32, height: u32) -> Result<(), FrameError> {
        self.pipeline.process(data, width, height)
    }
}
