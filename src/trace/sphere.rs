use glam::Vec3;

use crate::trace::ray::{Hit, Ray};
use crate::trace::surface::Material;

/// A sphere primitive with its material.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    /// Center position.
    pub center: Vec3,
    /// Radius.
    pub radius: f32,
    /// Surface material.
    pub material: Material,
}

impl Sphere {
    /// Intersect `ray` against the sphere, accepting only hits closer than the
    /// current `hit.t` and beyond `t_min`. Updates `hit` and returns the
    /// material on acceptance.
    pub fn hit(&self, ray: &Ray, t_min: f32, hit: &mut Hit) -> Option<&Material> {
        let oc = ray.origin - self.center;
        let a = ray.dir.dot(ray.dir);
        let half_b = oc.dot(ray.dir);
        let c = oc.dot(oc) - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();

        for t in [(-half_b - sqrt_d) / a, (-half_b + sqrt_d) / a] {
            if t > t_min && t < hit.t {
                hit.t = t;
                hit.point = ray.origin + t * ray.dir;
                hit.normal = (hit.point - self.center) / self.radius;
                return Some(&self.material);
            }
        }
        None
    }
}
