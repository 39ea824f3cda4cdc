//! Camera abstraction for preview capture.
//!
//! The driver is an external collaborator: it is acquired through a
//! [`DeviceProvider`], pushes raw frames into a [`FrameSink`] from its own
//! thread, and renders the preview onto a display surface it is told about.

use super::CaptureConfig;
use crate::coordinator::FrameSink;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// No camera, or it is held by someone else.
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    /// The display target or preview could not be configured.
    #[error("failed to set up preview: {0}")]
    PreviewSetupFailed(String),
    /// Stop requested while no preview was running.
    #[error("no active preview")]
    PreviewNotRunning,
    /// Preview requested before a display target was registered.
    #[error("no display surface attached")]
    NoSurface,
}

/// Display target the preview is rendered onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

impl SurfaceInfo {
    /// Describes a `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An acquired camera.
///
/// Implementations deliver frames by calling [`FrameSink::on_frame`] on
/// their own callback thread once the preview is running.
pub trait CaptureDevice: Send + 'static {
    /// Sets the rotation of the rendered preview.
    fn set_display_orientation(&mut self, degrees: u16) -> Result<(), DeviceError>;

    /// Registers the frame callback.
    fn set_frame_sink(&mut self, sink: FrameSink);

    /// Registers the display target for the preview.
    fn set_preview_display(&mut self, surface: &SurfaceInfo) -> Result<(), DeviceError>;

    /// Starts delivering preview frames.
    fn start_preview(&mut self) -> Result<(), DeviceError>;

    /// Stops the preview. Fails with [`DeviceError::PreviewNotRunning`]
    /// when there is nothing to stop.
    fn stop_preview(&mut self) -> Result<(), DeviceError>;

    /// Current preview dimensions.
    fn preview_size(&self) -> (u32, u32);

    /// Releases the underlying hardware.
    fn release(&mut self);
}

/// Opens camera devices.
pub trait DeviceProvider: Send + Sync + 'static {
    /// Camera handle produced by a successful acquisition.
    type Device: CaptureDevice;

    /// Attempts to acquire the camera. May block on slow hardware.
    fn acquire(&self, config: &CaptureConfig) -> Result<Self::Device, DeviceError>;
}
