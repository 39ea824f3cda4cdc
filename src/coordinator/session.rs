//! An open camera together with its display configuration.

use super::FrameSink;
use crate::capture::{CaptureDevice, DeviceError, SurfaceInfo};

/// Owns an acquired device for the duration of one open/close cycle.
///
/// The device is released exactly once, either by [`CaptureSession::shutdown`]
/// or when the session is dropped.
pub(crate) struct CaptureSession<D: CaptureDevice> {
    device: D,
    orientation: u16,
    surface: Option<SurfaceInfo>,
    previewing: bool,
    released: bool,
}

impl<D: CaptureDevice> CaptureSession<D> {
    pub(crate) fn new(device: D, orientation: u16, surface: Option<SurfaceInfo>) -> Self {
        Self {
            device,
            orientation,
            surface,
            previewing: false,
            released: false,
        }
    }

    /// Applies orientation, registers the frame callback and display
    /// target, then starts the preview.
    pub(crate) fn start(&mut self, sink: FrameSink) -> Result<(), DeviceError> {
        self.device.set_display_orientation(self.orientation)?;
        self.device.set_frame_sink(sink);
        self.start_preview()
    }

    fn start_preview(&mut self) -> Result<(), DeviceError> {
        let surface = self.surface.ok_or(DeviceError::NoSurface)?;
        self.device.set_preview_display(&surface)?;
        self.device.start_preview()?;
        self.previewing = true;
        Ok(())
    }

    /// Stops the preview. Stopping an inactive preview is not an error.
    pub(crate) fn stop_preview(&mut self) {
        if let Err(e) = self.device.stop_preview() {
            if self.previewing {
                tracing::warn!(error = %e, "failed to stop running preview");
            } else {
                tracing::debug!(error = %e, "ignoring stop_preview failure");
            }
        }
        self.previewing = false;
    }

    /// Restarts the preview on a new display target.
    pub(crate) fn resize(&mut self, surface: SurfaceInfo) -> Result<(), DeviceError> {
        self.stop_preview();
        self.surface = Some(surface);
        self.start_preview()
    }

    /// Stops the preview and releases the device.
    pub(crate) fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.stop_preview();
        self.device.release();
        self.released = true;
        tracing::info!("capture device released");
    }

    /// Preview dimensions reported by the device.
    pub(crate) fn preview_size(&self) -> (u32, u32) {
        self.device.preview_size()
    }
}

impl<D: CaptureDevice> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        self.release();
    }
}
