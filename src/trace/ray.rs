use glam::Vec3;

/// A ray with an origin and a normalized direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Normalized ray direction.
    pub dir: Vec3,
}

/// Nearest-hit record filled in by intersection tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hit {
    /// Ray parameter of the hit.
    pub t: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// Unit surface normal at the hit point.
    pub normal: Vec3,
}
