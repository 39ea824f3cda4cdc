//! Synthetic camera used by tests and the demo binary.

use super::camera::{CaptureDevice, DeviceError, DeviceProvider, SurfaceInfo};
use super::{CaptureConfig, RawFrame};
use crate::coordinator::FrameSink;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Provider handing out [`MockDevice`]s.
#[derive(Debug, Clone)]
pub struct MockProvider {
    available: bool,
    fail_preview: bool,
    acquire_delay: Duration,
    acquisitions: Arc<AtomicUsize>,
}

impl MockProvider {
    /// A provider with an available camera.
    pub fn new() -> Self {
        Self {
            available: true,
            fail_preview: false,
            acquire_delay: Duration::ZERO,
            acquisitions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider whose camera is missing or busy.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Simulates slow device I/O during acquisition.
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }

    /// Devices from this provider refuse to start their preview.
    pub fn with_failing_preview(mut self) -> Self {
        self.fail_preview = true;
        self
    }

    /// Number of acquisition attempts made so far.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProvider for MockProvider {
    type Device = MockDevice;

    fn acquire(&self, config: &CaptureConfig) -> Result<MockDevice, DeviceError> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if !self.acquire_delay.is_zero() {
            thread::sleep(self.acquire_delay);
        }

        if !self.available {
            return Err(DeviceError::Unavailable(
                "no camera hardware or camera busy".to_string(),
            ));
        }
        config
            .validate()
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

        tracing::info!(
            device_id = config.device_id,
            width = config.width,
            height = config.height,
            "MockDevice acquired"
        );
        Ok(MockDevice::new(config, self.fail_preview))
    }
}

struct PreviewThread {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Mock camera generating a moving NV21 test pattern.
pub struct MockDevice {
    width: u32,
    height: u32,
    frame_interval: Duration,
    orientation: u16,
    fail_preview: bool,
    sink: Option<FrameSink>,
    surface: Option<SurfaceInfo>,
    preview: Option<PreviewThread>,
}

impl MockDevice {
    fn new(config: &CaptureConfig, fail_preview: bool) -> Self {
        Self {
            width: config.width,
            height: config.height,
            frame_interval: Duration::from_millis(1000 / u64::from(config.fps.max(1))),
            orientation: 0,
            fail_preview,
            sink: None,
            surface: None,
            preview: None,
        }
    }

    /// Returns the rotation last applied to the preview.
    pub fn orientation(&self) -> u16 {
        self.orientation
    }

    /// Returns true while the generator thread is running.
    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    fn halt_preview(&mut self) -> bool {
        match self.preview.take() {
            Some(preview) => {
                preview.stop.store(true, Ordering::Release);
                if preview.handle.join().is_err() {
                    tracing::warn!("MockDevice preview thread panicked");
                }
                true
            }
            None => false,
        }
    }
}

impl CaptureDevice for MockDevice {
    fn set_display_orientation(&mut self, degrees: u16) -> Result<(), DeviceError> {
        self.orientation = degrees;
        Ok(())
    }

    fn set_frame_sink(&mut self, sink: FrameSink) {
        self.sink = Some(sink);
    }

    fn set_preview_display(&mut self, surface: &SurfaceInfo) -> Result<(), DeviceError> {
        if surface.width == 0 || surface.height == 0 {
            return Err(DeviceError::PreviewSetupFailed(format!(
                "surface {}x{} has no area",
                surface.width, surface.height
            )));
        }
        self.surface = Some(*surface);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), DeviceError> {
        if self.fail_preview {
            return Err(DeviceError::PreviewSetupFailed(
                "preview refused by mock device".to_string(),
            ));
        }
        if self.surface.is_none() {
            return Err(DeviceError::NoSurface);
        }
        if self.preview.is_some() {
            return Ok(());
        }

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let sink = self.sink.clone();
        let (width, height, interval) = (self.width, self.height, self.frame_interval);

        let handle = thread::Builder::new()
            .name("mock-preview".to_string())
            .spawn(move || run_preview(sink, width, height, interval, thread_stop))
            .map_err(|e| DeviceError::PreviewSetupFailed(e.to_string()))?;

        self.preview = Some(PreviewThread { stop, handle });
        tracing::debug!(width, height, "MockDevice preview started");
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), DeviceError> {
        if self.halt_preview() {
            tracing::debug!("MockDevice preview stopped");
            Ok(())
        } else {
            Err(DeviceError::PreviewNotRunning)
        }
    }

    fn preview_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        self.halt_preview();
        self.sink = None;
        self.surface = None;
        tracing::info!("MockDevice released");
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.halt_preview();
    }
}

/// Frame generator loop. One buffer is reused for every frame, the way
/// real drivers recycle their preview buffers.
fn run_preview(
    sink: Option<FrameSink>,
    width: u32,
    height: u32,
    interval: Duration,
    stop: Arc<AtomicBool>,
) {
    let mut buffer = vec![0u8; RawFrame::expected_len(width, height)];
    let mut sequence = 0u64;

    while !stop.load(Ordering::Acquire) {
        fill_test_pattern(&mut buffer, width, height, sequence);

        if let Some(sink) = &sink {
            if let Err(e) = sink.on_frame(&buffer, width, height) {
                tracing::error!(error = %e, "frame rejected, stopping mock preview");
                break;
            }
        }

        sequence = sequence.wrapping_add(1);
        thread::sleep(interval);
    }
}

/// Writes a diagonal luma ramp and slowly rotating chroma into `buffer`.
pub fn fill_test_pattern(buffer: &mut [u8], width: u32, height: u32, sequence: u64) {
    let (w, h) = (width as usize, height as usize);
    let (luma, chroma) = buffer.split_at_mut(w * h);

    for (row, line) in luma.chunks_exact_mut(w).enumerate() {
        for (col, y) in line.iter_mut().enumerate() {
            *y = (16 + (row + col + sequence as usize) % 220) as u8;
        }
    }

    let phase = (sequence % 256) as u8;
    for pair in chroma.chunks_exact_mut(2) {
        pair[0] = phase;
        pair[1] = 255 - phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_provider() {
        let provider = MockProvider::unavailable();
        let result = provider.acquire(&CaptureConfig::default());

        assert!(matches!(result, Err(DeviceError::Unavailable(_))));
        assert_eq!(provider.acquisitions(), 1);
    }

    #[test]
    fn test_stop_without_start() {
        let provider = MockProvider::new();
        let mut device = provider.acquire(&CaptureConfig::default()).unwrap();

        assert_eq!(device.stop_preview(), Err(DeviceError::PreviewNotRunning));
    }

    #[test]
    fn test_preview_requires_surface() {
        let provider = MockProvider::new();
        let mut device = provider.acquire(&CaptureConfig::default()).unwrap();

        assert_eq!(device.start_preview(), Err(DeviceError::NoSurface));

        device
            .set_preview_display(&SurfaceInfo::new(640, 480))
            .unwrap();
        device.start_preview().unwrap();
        assert!(device.is_previewing());

        device.stop_preview().unwrap();
        assert!(!device.is_previewing());
    }

    #[test]
    fn test_orientation_is_recorded() {
        let provider = MockProvider::new();
        let mut device = provider.acquire(&CaptureConfig::default()).unwrap();
        assert_eq!(device.orientation(), 0);

        device.set_display_orientation(270).unwrap();
        assert_eq!(device.orientation(), 270);
    }

    #[test]
    fn test_pattern_is_valid_frame() {
        let mut buffer = vec![0u8; RawFrame::expected_len(8, 6)];
        fill_test_pattern(&mut buffer, 8, 6, 3);

        let frame = RawFrame::new(&buffer, 8, 6).unwrap();
        assert!(frame.luma().iter().all(|&y| y >= 16));
        assert_eq!(frame.chroma()[0], 3);
        assert_eq!(frame.chroma()[1], 252);
    }
}
