//! Dedicated thread for device open/close.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs device jobs one at a time, in submission order.
pub(crate) struct DeviceWorker {
    jobs: Sender<Job>,
    _thread: JoinHandle<()>,
}

impl DeviceWorker {
    pub(crate) fn spawn() -> std::io::Result<Self> {
        let (jobs, rx) = mpsc::channel::<Job>();
        let thread = thread::Builder::new()
            .name("capture-device".to_string())
            .spawn(move || {
                for job in rx {
                    job();
                }
                tracing::debug!("capture device worker exiting");
            })?;

        tracing::info!("capture device worker started");
        Ok(Self {
            jobs,
            _thread: thread,
        })
    }

    /// Queues a job. Hands the job back if the thread has exited.
    pub(crate) fn submit(&self, job: Job) -> Result<(), Job> {
        self.jobs.send(job).map_err(|mpsc::SendError(job)| job)
    }
}
