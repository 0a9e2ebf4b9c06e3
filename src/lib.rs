//! Raytide renders a ray-traced image across a fixed pool of worker threads
//! while a controlling layer polls progressive snapshots, reports elapsed
//! time, and signals completion exactly once.
//!
//! The public surface is small:
//!
//! - Build a [`WorkerPool`] once, sized by [`WorkerPool::max_concurrency`]
//! - Hand it to a [`RenderController`] and call
//!   [`start_render`](RenderController::start_render) with a [`PixelSource`]
//! - Receive progress and the final frame through a [`ProgressSink`]
//!
//! Jobs can also be driven directly via [`RenderJob`] when no polling
//! cadence is needed. The built-in [`Tracer`] supplies pixels for the demo
//! scene; any other `PixelSource` plugs into the same orchestration.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod render;
pub mod trace;

pub use crate::foundation::core::{Canvas, FrameRgba, Rgba8};
pub use crate::foundation::error::{RaytideError, RaytideResult, RenderFailure};

pub use crate::render::controller::{
    ControllerOpts, ProgressSink, RecordedEvents, RecordingSink, RenderController,
};
pub use crate::render::framebuffer::{BandWriter, Framebuffer};
pub use crate::render::job::{PixelSource, RenderJob};
pub use crate::render::partition::{RowBand, partition_rows};
pub use crate::render::pool::WorkerPool;

pub use crate::trace::tracer::{Tracer, TracerOpts};
