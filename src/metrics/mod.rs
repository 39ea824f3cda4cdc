//! Prometheus metrics for the capture pipeline.
//!
//! # Metrics Exposed
//!
//! ## Frame path
//! - `color_probe_frames_received_total` - Frames delivered by the device
//! - `color_probe_frames_dropped_total` - Frames discarded while disarmed
//! - `color_probe_frames_converted_total` - Frames converted to RGB
//! - `color_probe_malformed_frames_total` - Frames rejected for bad size
//! - `color_probe_samples_published_total` - Samples posted to the consumer
//!
//! ## Device lifecycle
//! - `color_probe_device_open_attempts_total` - Open attempts
//! - `color_probe_device_open_failures_total` - Open attempts with no camera
//!
//! ## State
//! - `color_probe_armed` - 1 while armed
//! - `color_probe_history_length` - Samples retained in the history
//!
//! With the `metrics` feature, [`MetricsServer`] exposes the registry over
//! HTTP.

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
