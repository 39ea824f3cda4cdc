//! Metrics collection and registry.

use crate::coordinator::CaptureStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of capture state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether frames are currently being sampled.
    pub armed: bool,
    /// Frames delivered by the device.
    pub frames_received: u64,
    /// Frames discarded while disarmed.
    pub frames_dropped: u64,
    /// Frames converted to RGB.
    pub frames_converted: u64,
    /// Frames rejected for an inconsistent size.
    pub malformed_frames: u64,
    /// Samples posted to the consumer.
    pub samples_published: u64,
    /// Device open attempts.
    pub open_attempts: u64,
    /// Device open attempts that found no camera.
    pub open_failures: u64,
    /// Samples currently held in the history.
    pub history_len: usize,
}

impl MetricsSnapshot {
    /// Builds a snapshot from coordinator counters and the history size.
    pub fn from_stats(stats: &CaptureStats, history_len: usize) -> Self {
        Self {
            armed: stats.armed,
            frames_received: stats.pipeline.frames_received,
            frames_dropped: stats.pipeline.frames_dropped,
            frames_converted: stats.pipeline.frames_converted,
            malformed_frames: stats.pipeline.malformed_frames,
            samples_published: stats.pipeline.samples_published,
            open_attempts: stats.open_attempts,
            open_failures: stats.open_failures,
            history_len,
        }
    }
}

/// Prometheus metrics registry for capture monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    armed: IntGauge,
    history_len: IntGauge,

    // Frame path
    frames_received: IntCounter,
    frames_dropped: IntCounter,
    frames_converted: IntCounter,
    malformed_frames: IntCounter,
    samples_published: IntCounter,

    // Device lifecycle
    open_attempts: IntCounter,
    open_failures: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, MetricsError> {
    let gauge = IntGauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

/// Counters only move forward; catch up to the observed total.
fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsRegistry {
    /// Creates a new registry with all capture metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        Ok(Self {
            armed: gauge(
                &registry,
                "color_probe_armed",
                "Whether frames are being sampled (1=armed, 0=disarmed)",
            )?,
            history_len: gauge(
                &registry,
                "color_probe_history_length",
                "Samples currently retained in the history",
            )?,
            frames_received: counter(
                &registry,
                "color_probe_frames_received_total",
                "Frames delivered by the capture device",
            )?,
            frames_dropped: counter(
                &registry,
                "color_probe_frames_dropped_total",
                "Frames discarded while disarmed",
            )?,
            frames_converted: counter(
                &registry,
                "color_probe_frames_converted_total",
                "Frames converted from NV21 to RGB",
            )?,
            malformed_frames: counter(
                &registry,
                "color_probe_malformed_frames_total",
                "Frames rejected because their size did not match their dimensions",
            )?,
            samples_published: counter(
                &registry,
                "color_probe_samples_published_total",
                "Samples posted to the consumer",
            )?,
            open_attempts: counter(
                &registry,
                "color_probe_device_open_attempts_total",
                "Capture device open attempts",
            )?,
            open_failures: counter(
                &registry,
                "color_probe_device_open_failures_total",
                "Capture device open attempts that found no usable camera",
            )?,
            registry,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.armed.set(i64::from(snapshot.armed));
        self.history_len.set(snapshot.history_len as i64);

        advance(&self.frames_received, snapshot.frames_received);
        advance(&self.frames_dropped, snapshot.frames_dropped);
        advance(&self.frames_converted, snapshot.frames_converted);
        advance(&self.malformed_frames, snapshot.malformed_frames);
        advance(&self.samples_published, snapshot.samples_published);
        advance(&self.open_attempts, snapshot.open_attempts);
        advance(&self.open_failures, snapshot.open_failures);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::PipelineStats;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let stats = CaptureStats {
            pipeline: PipelineStats {
                frames_received: 120,
                frames_dropped: 20,
                frames_converted: 100,
                malformed_frames: 0,
                samples_published: 100,
            },
            open_attempts: 1,
            open_failures: 0,
            armed: true,
        };
        registry.update(&MetricsSnapshot::from_stats(&stats, 100));

        let output = registry.encode().unwrap();
        assert!(output.contains("color_probe_armed 1"));
        assert!(output.contains("color_probe_frames_received_total 120"));
        assert!(output.contains("color_probe_frames_dropped_total 20"));
        assert!(output.contains("color_probe_history_length 100"));
    }

    #[test]
    fn test_counters_do_not_go_backwards() {
        let registry = MetricsRegistry::new().unwrap();

        registry.update(&MetricsSnapshot {
            frames_received: 50,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames_received: 10,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("color_probe_frames_received_total 50"));
    }
}
