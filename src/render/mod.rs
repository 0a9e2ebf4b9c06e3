//! Render orchestration: the fixed worker pool, render jobs with partitioned
//! framebuffer writes and progressive snapshots, and the polling controller.

/// Render lifecycle state machine and its observer boundary.
pub mod controller;
/// Shared atomic framebuffer and band-scoped writers.
pub mod framebuffer;
/// In-flight render jobs and the pixel-source seam.
pub mod job;
/// Deterministic row-band partitioning.
pub mod partition;
/// The fixed-size worker pool.
pub mod pool;
