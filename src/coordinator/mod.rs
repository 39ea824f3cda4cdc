//! Capture coordination.
//!
//! Three threads cooperate here:
//!
//! ```text
//! caller ──open/close──▶ capture-device worker ──acquire──▶ driver
//!                                                             │
//!                          driver callback thread ◀───────────┘
//!                                   │ FrameSink::on_frame
//!                                   ▼
//!                 decode_nv21 → center_sample → sample-consumer
//! ```
//!
//! The armed flag is the only state shared with the callback thread, and
//! it is atomic. Everything else the callback needs lives in the frame
//! pipeline behind an `Arc`.

mod control;
mod pipeline;
mod session;
mod surface;
mod worker;

pub use control::{CaptureCoordinator, CaptureState, CaptureStats, OpenOutcome};
pub use pipeline::{FrameSink, PipelineStats};
pub use surface::SurfaceLifecycle;
