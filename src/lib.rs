//! Color Probe Library
//!
//! Samples the center color of a live camera preview. Raw NV21 frames are
//! converted to packed ARGB on the camera's callback thread, reduced to a
//! single color, and posted to a consumer thread that keeps the most
//! recent samples.
//!
//! # Architecture
//!
//! ```text
//! capture → conversion → consumer → history
//!     ↑          ↑
//!   coordinator (device lifecycle, armed gating)
//! ```
//!
//! # Design Principles
//!
//! - **Capture never waits**: samples are posted to an unbounded channel
//! - **Disarmed is free**: frames are dropped before any conversion
//! - **Device I/O is isolated**: open and close run on a dedicated thread
//! - **Device failures stay local**: an unavailable camera is an outcome,
//!   not a crash
//!
//! # Example
//!
//! ```no_run
//! use color_probe::{
//!     capture::{CaptureConfig, MockProvider, SurfaceInfo},
//!     consumer::SampleConsumer,
//!     conversion::Sample,
//!     coordinator::{CaptureCoordinator, SurfaceLifecycle},
//! };
//!
//! let consumer = SampleConsumer::spawn(|sample: Sample| println!("{sample}")).unwrap();
//! let coordinator =
//!     CaptureCoordinator::new(MockProvider::new(), CaptureConfig::default(), consumer.sender());
//! let surface = SurfaceLifecycle::new(coordinator.clone());
//!
//! surface.surface_created(SurfaceInfo::new(640, 480));
//! coordinator.arm();
//! std::thread::sleep(std::time::Duration::from_millis(500));
//! coordinator.disarm();
//! surface.surface_destroyed();
//!
//! let history = consumer.finish().unwrap();
//! println!("{:?}", history.to_hex_strings());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod consumer;
pub mod conversion;
pub mod coordinator;
pub mod history;
pub mod metrics;

// Re-export commonly used types at crate root
pub use capture::{CaptureConfig, CaptureDevice, DeviceProvider, MockProvider, RawFrame, SurfaceInfo};
pub use consumer::{SampleConsumer, SampleHandler};
pub use conversion::{center_sample, decode_nv21, PixelBuffer, Sample};
pub use coordinator::{CaptureCoordinator, CaptureState, FrameSink, OpenOutcome, SurfaceLifecycle};
pub use history::{BoundedHistory, HistoryExport, HISTORY_CAPACITY};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
