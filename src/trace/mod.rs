//! The built-in ray tracer: the compute collaborator behind the orchestration
//! core's [`PixelSource`](crate::render::job::PixelSource) seam.
//!
//! Nothing in here knows about pools, jobs, or controllers; it only answers
//! "what color is pixel (x, y)".

/// Pinhole camera.
pub mod camera;
/// Rays and hit records.
pub mod ray;
/// Sphere scenes, including the demo scene.
pub mod scene;
/// Sphere primitive and intersection.
pub mod sphere;
/// Materials and scattering models.
pub mod surface;
/// The path tracer itself.
pub mod tracer;
