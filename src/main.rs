//! Color Probe CLI
//!
//! Runs a simulated capture session against the mock camera, or samples
//! the center color of a raw NV21 file.

use clap::{Parser, Subcommand};
use color_probe::{
    capture::{FileConfig, MockProvider, SurfaceInfo},
    consumer::SampleConsumer,
    conversion::{sample_frame, Sample},
    coordinator::{CaptureCoordinator, OpenOutcome, SurfaceLifecycle},
    history::HistoryExport,
    metrics::{MetricsRegistry, MetricsSnapshot},
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "color-probe", version, about = "Center-pixel color sampling from NV21 camera frames")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a capture session against the mock camera.
    Run {
        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Session length in milliseconds.
        #[arg(long)]
        duration_ms: Option<u64>,
        /// Preview width override.
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Preview height override.
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },
    /// Print the center color of a raw NV21 file.
    Probe {
        /// Path to the raw frame.
        path: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run {
            config,
            duration_ms,
            width,
            height,
        } => run_session(config, duration_ms, width.zip(height)),
        Command::Probe {
            path,
            width,
            height,
        } => probe_file(&path, width, height),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn probe_file(path: &Path, width: u32, height: u32) -> Result<(), String> {
    let data = std::fs::read(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let sample = sample_frame(&data, width, height).map_err(|e| e.to_string())?;
    println!("{}", sample);
    Ok(())
}

fn run_session(
    config_path: Option<PathBuf>,
    duration_ms: Option<u64>,
    dimensions: Option<(u32, u32)>,
) -> Result<(), String> {
    let mut config = match config_path {
        Some(path) => FileConfig::from_file(&path).map_err(|e| e.to_string())?,
        None => FileConfig::default(),
    };
    if let Some(ms) = duration_ms {
        config.session.duration_ms = ms;
    }
    if let Some((width, height)) = dimensions {
        config.capture.width = width;
        config.capture.height = height;
    }
    config.capture.validate().map_err(|e| e.to_string())?;

    info!("Color Probe v{}", color_probe::VERSION);
    info!("This is a demonstration using mock camera input");

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    let received = Arc::new(AtomicUsize::new(0));
    let consumer = {
        let received = Arc::clone(&received);
        SampleConsumer::spawn(move |sample: Sample| {
            received.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(color = %sample, "sample");
        })
        .map_err(|e| e.to_string())?
    };

    let metrics = Arc::new(MetricsRegistry::new().map_err(|e| e.to_string())?);
    start_metrics_server(&metrics, config.session.metrics_port);

    let coordinator =
        CaptureCoordinator::new(MockProvider::new(), config.capture.clone(), consumer.sender());
    let surface = SurfaceLifecycle::new(coordinator.clone());

    let outcome = surface.surface_created(SurfaceInfo::new(config.capture.width, config.capture.height));
    match &outcome {
        OpenOutcome::Opened => info!("Camera preview running"),
        OpenOutcome::PreviewSetupFailed(reason) => warn!("Preview not running: {}", reason),
        OpenOutcome::Unavailable(reason) => {
            return Err(format!("camera unavailable: {}", reason));
        }
    }

    let started = Instant::now();
    let arm_at = Duration::from_millis(config.session.arm_delay_ms);
    let end_at = Duration::from_millis(config.session.duration_ms);

    while started.elapsed() < end_at && !stop.load(Ordering::SeqCst) {
        if !coordinator.is_armed() && started.elapsed() >= arm_at {
            coordinator.arm();
        }
        let snapshot = MetricsSnapshot::from_stats(
            &coordinator.stats(),
            received.load(Ordering::Relaxed).min(color_probe::HISTORY_CAPACITY),
        );
        metrics.update(&snapshot);
        std::thread::sleep(Duration::from_millis(50));
    }

    coordinator.disarm();
    surface.surface_destroyed();

    let stats = coordinator.stats();
    let history = consumer.finish().map_err(|e| e.to_string())?;
    metrics.update(&MetricsSnapshot::from_stats(&stats, history.len()));

    info!(
        "Processed {} frames: {} converted, {} dropped while disarmed",
        stats.pipeline.frames_received, stats.pipeline.frames_converted, stats.pipeline.frames_dropped
    );

    let export = HistoryExport::from_history(&history);
    info!("Exported {} samples at {}", export.len(), export.exported_at.to_rfc3339());
    for color in &export.colors {
        println!("#{}", color);
    }

    Ok(())
}

#[cfg(feature = "metrics")]
fn start_metrics_server(registry: &Arc<MetricsRegistry>, port: u16) {
    use color_probe::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        return;
    }

    let server = MetricsServer::new(MetricsServerConfig::with_port(port), Arc::clone(registry));
    let spawned = std::thread::Builder::new()
        .name("metrics-server".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Failed to start metrics runtime: {}", e);
                    return;
                }
            };
            if let Err(e) = runtime.block_on(server.run()) {
                warn!("Metrics server stopped: {}", e);
            }
        });

    if let Err(e) = spawned {
        warn!("Failed to spawn metrics thread: {}", e);
    }
}

#[cfg(not(feature = "metrics"))]
fn start_metrics_server(_registry: &Arc<MetricsRegistry>, port: u16) {
    if port != 0 {
        tracing::debug!(port, "metrics server disabled (built without the metrics feature)");
    }
}
