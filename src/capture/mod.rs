//! Camera input and frame handling.
//!
//! This module provides the device abstraction the coordinator drives,
//! the borrowed NV21 frame view handed to the frame callback, and the
//! capture configuration.

mod camera;
mod config;
mod frame;
mod mock;

pub use camera::{CaptureDevice, DeviceError, DeviceProvider, SurfaceInfo};
pub use config::{CaptureConfig, ConfigError, FileConfig, SessionConfig};
pub use frame::{FrameError, RawFrame};
pub use mock::{fill_test_pattern, MockDevice, MockProvider};
