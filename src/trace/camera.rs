use glam::{Quat, Vec3};

use crate::foundation::core::Canvas;
use crate::trace::ray::Ray;

/// Pinhole camera mapping canvas coordinates to primary rays.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec3,
    dir: Vec3,
    rot: Quat,
    fov_adjust: f32,
    width: f32,
    height: f32,
    aspect: f32,
}

impl Camera {
    const FOV_DEGREES: f32 = 90.0;

    /// Create a camera at `pos` looking along the normalized `dir`, projecting
    /// onto a canvas of the given dimensions.
    pub fn new(pos: Vec3, dir: Vec3, canvas: Canvas) -> Self {
        let dir = dir.normalize();
        let width = canvas.width as f32;
        let height = canvas.height as f32;
        Self {
            pos,
            dir,
            rot: Quat::from_rotation_arc(Vec3::NEG_Z, dir),
            fov_adjust: (Self::FOV_DEGREES.to_radians() / 2.0).tan(),
            width,
            height,
            aspect: width / height,
        }
    }

    /// Primary ray through canvas position `(x, y)`; fractional coordinates
    /// select sub-pixel sample positions.
    pub fn ray_for(&self, x: f32, y: f32) -> Ray {
        let sensor_x = (((x + 0.5) / self.width) * 2.0 - 1.0) * self.aspect * self.fov_adjust;
        let sensor_y = (1.0 - ((y + 0.5) / self.height) * 2.0) * self.fov_adjust;
        let offset = self.rot * Vec3::new(sensor_x, sensor_y, -1.0);
        Ray {
            origin: self.pos,
            dir: (self.dir + offset).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rays_are_normalized_and_roughly_forward() {
        let canvas = Canvas::new(64, 48).unwrap();
        let camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, canvas);
        for (x, y) in [(0.0, 0.0), (31.5, 23.5), (63.0, 47.0)] {
            let ray = camera.ray_for(x, y);
            assert!((ray.dir.length() - 1.0).abs() < 1e-4);
            assert!(ray.dir.z < 0.0, "ray points away from the view direction");
        }
    }

    #[test]
    fn center_pixel_looks_along_the_view_direction() {
        let canvas = Canvas::new(100, 100).unwrap();
        let dir = Vec3::new(0.8, 0.0, -0.6).normalize();
        let camera = Camera::new(Vec3::ZERO, dir, canvas);
        // (49.0, 49.0) lands on the canvas center after the half-pixel shift.
        let ray = camera.ray_for(49.0, 49.0);
        assert!(ray.dir.dot(dir) > 0.99, "dot = {}", ray.dir.dot(dir));
    }
}
