//! Consumer context for delivered samples.
//!
//! A dedicated thread owns the [`BoundedHistory`] and runs the caller's
//! [`SampleHandler`]. The capture side only ever posts to an unbounded
//! channel, so it never waits on the consumer.

use crate::conversion::Sample;
use crate::history::BoundedHistory;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Errors from the consumer thread.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The OS refused to start the thread.
    #[error("failed to spawn consumer thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// The thread has exited.
    #[error("consumer thread is no longer running")]
    Disconnected,
}

/// Receives capture results on the consumer thread.
///
/// Any `FnMut(Sample)` closure is a handler.
pub trait SampleHandler: Send + 'static {
    /// Called once per sample, in delivery order.
    fn on_sample(&mut self, sample: Sample);

    /// Called when the camera could not be opened.
    fn on_device_unavailable(&mut self, _reason: &str) {}
}

impl<F> SampleHandler for F
where
    F: FnMut(Sample) + Send + 'static,
{
    fn on_sample(&mut self, sample: Sample) {
        self(sample)
    }
}

pub(crate) enum ConsumerMessage {
    Sample(Sample),
    DeviceUnavailable(String),
    Snapshot(Sender<Vec<Sample>>),
    Shutdown,
}

/// Posting end used by the capture side. Sending never blocks.
#[derive(Clone)]
pub struct SampleSender {
    tx: Sender<ConsumerMessage>,
}

impl SampleSender {
    /// Posts a sample. Returns false if the consumer has gone away.
    pub fn send_sample(&self, sample: Sample) -> bool {
        self.tx.send(ConsumerMessage::Sample(sample)).is_ok()
    }

    /// Posts the out-of-band "no camera" notification.
    pub fn send_unavailable(&self, reason: impl Into<String>) -> bool {
        self.tx
            .send(ConsumerMessage::DeviceUnavailable(reason.into()))
            .is_ok()
    }
}

/// Handle to the running consumer thread.
pub struct SampleConsumer {
    tx: Sender<ConsumerMessage>,
    thread: Option<JoinHandle<BoundedHistory>>,
}

impl SampleConsumer {
    /// Starts the consumer thread.
    pub fn spawn(handler: impl SampleHandler) -> Result<Self, ConsumerError> {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("sample-consumer".to_string())
            .spawn(move || run_consumer(rx, handler))?;

        Ok(Self {
            tx,
            thread: Some(thread),
        })
    }

    /// Returns a sender for the capture side.
    pub fn sender(&self) -> SampleSender {
        SampleSender {
            tx: self.tx.clone(),
        }
    }

    /// Returns the current history once every message queued before this
    /// call has been handled.
    pub fn snapshot(&self) -> Result<Vec<Sample>, ConsumerError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(ConsumerMessage::Snapshot(reply_tx))
            .map_err(|_| ConsumerError::Disconnected)?;
        reply_rx.recv().map_err(|_| ConsumerError::Disconnected)
    }

    /// Stops the thread after it drains queued samples and returns the
    /// final history.
    pub fn finish(mut self) -> Result<BoundedHistory, ConsumerError> {
        self.shutdown().ok_or(ConsumerError::Disconnected)
    }

    fn shutdown(&mut self) -> Option<BoundedHistory> {
        let thread = self.thread.take()?;
        let _ = self.tx.send(ConsumerMessage::Shutdown);
        match thread.join() {
            Ok(history) => Some(history),
            Err(_) => {
                tracing::error!("sample consumer thread panicked");
                None
            }
        }
    }
}

impl Drop for SampleConsumer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_consumer(rx: Receiver<ConsumerMessage>, mut handler: impl SampleHandler) -> BoundedHistory {
    let mut history = BoundedHistory::new();

    for message in rx {
        match message {
            ConsumerMessage::Sample(sample) => {
                history.append(sample);
                handler.on_sample(sample);
            }
            ConsumerMessage::DeviceUnavailable(reason) => {
                tracing::warn!(reason = %reason, "camera unavailable, no samples will arrive");
                handler.on_device_unavailable(&reason);
            }
            ConsumerMessage::Snapshot(reply) => {
                let _ = reply.send(history.snapshot());
            }
            ConsumerMessage::Shutdown => break,
        }
    }

    tracing::debug!(samples = history.len(), "sample consumer stopped");
    history
}
