use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::trace::ray::{Hit, Ray};
use crate::trace::sphere::Sphere;
use crate::trace::surface::{Material, Surface};

/// A renderable collection of spheres.
pub struct Scene {
    /// Scene contents.
    pub spheres: Vec<Sphere>,
}

impl Scene {
    /// The demo scene: a large ground sphere, three feature spheres (metal,
    /// glass, diffuse), and a jittered grid of small diffuse spheres. `seed`
    /// fixes the jitter so the same seed always yields the same scene.
    pub fn demo(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut spheres = Vec::with_capacity(30);

        spheres.push(Sphere {
            center: Vec3::new(0.0, -1000.0, 0.0),
            radius: 1000.0,
            material: Material {
                surface: Surface::Lambertian,
                albedo: Vec3::splat(0.5),
            },
        });
        spheres.push(Sphere {
            center: Vec3::new(0.0, 1.0, 0.0),
            radius: 1.0,
            material: Material {
                surface: Surface::Metallic,
                albedo: Vec3::new(0.4, 0.2, 0.6),
            },
        });
        spheres.push(Sphere {
            center: Vec3::new(-0.5, 1.0, 6.5),
            radius: 1.0,
            material: Material {
                surface: Surface::Dielectric,
                albedo: Vec3::ONE,
            },
        });
        spheres.push(Sphere {
            center: Vec3::new(3.5, 1.0, 8.5),
            radius: 1.0,
            material: Material {
                surface: Surface::Lambertian,
                albedo: Vec3::new(0.8, 0.4, 0.2),
            },
        });

        for i in 4..30u32 {
            let grid_x = i / 10;
            let grid_y = i as f32 - 10.0 * grid_x as f32;
            let jitter = Vec3::new(rng.random::<f32>(), 0.0, rng.random::<f32>());
            spheres.push(Sphere {
                center: Vec3::new(grid_x as f32, 0.2, grid_y) + jitter,
                radius: 0.2,
                material: Material {
                    surface: Surface::Lambertian,
                    albedo: Vec3::new(rng.random(), rng.random(), rng.random()),
                },
            });
        }

        Self { spheres }
    }

    /// Find the nearest intersection in `(t_min, t_max)`, filling `hit` and
    /// returning the material of the closest surface.
    pub fn traverse(&self, ray: &Ray, t_min: f32, t_max: f32, hit: &mut Hit) -> Option<&Material> {
        hit.t = t_max;
        let mut nearest = None;
        for sphere in &self.spheres {
            if let Some(material) = sphere.hit(ray, t_min, hit) {
                nearest = Some(material);
            }
        }
        nearest
    }
}
