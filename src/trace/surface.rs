use glam::Vec3;
use rand::Rng;

use crate::trace::ray::{Hit, Ray};

/// Surface material: scattering behavior plus albedo.
#[derive(Clone, Copy, Debug)]
pub struct Material {
    /// How rays scatter off the surface.
    pub surface: Surface,
    /// Per-channel reflectance applied on each bounce.
    pub albedo: Vec3,
}

/// Supported scattering models.
#[derive(Clone, Copy, Debug)]
pub enum Surface {
    /// Diffuse scatter around the surface normal.
    Lambertian,
    /// Mirror reflection; rays scattered into the surface are absorbed.
    Metallic,
    /// Glass-like refraction/reflection split (refractive index 1.5).
    Dielectric,
}

const DIELECTRIC_IOR: f32 = 1.5;

impl Surface {
    /// Scatter `ray` in place at `hit`. Returns `false` when the ray is
    /// absorbed instead.
    pub fn scatter<R: Rng>(self, ray: &mut Ray, hit: &Hit, rng: &mut R) -> bool {
        match self {
            Surface::Lambertian => {
                ray.origin = hit.point;
                ray.dir = (hit.normal + random_unit_vector(rng)).normalize();
                true
            }
            Surface::Metallic => {
                let reflected = reflect(ray.dir.normalize(), hit.normal);
                ray.origin = hit.point;
                ray.dir = reflected;
                reflected.dot(hit.normal) > 0.0
            }
            Surface::Dielectric => {
                let entering = ray.dir.dot(hit.normal) <= 0.0;
                let (outward_normal, eta, cosine) = if entering {
                    (
                        hit.normal,
                        1.0 / DIELECTRIC_IOR,
                        -ray.dir.dot(hit.normal),
                    )
                } else {
                    (
                        -hit.normal,
                        DIELECTRIC_IOR,
                        DIELECTRIC_IOR * ray.dir.dot(hit.normal),
                    )
                };

                let refracted = refract(ray.dir, outward_normal, eta);
                let reflect_prob = match refracted {
                    Some(_) => schlick(cosine, DIELECTRIC_IOR),
                    None => 1.0,
                };

                ray.origin = hit.point;
                ray.dir = match refracted {
                    Some(dir) if rng.random::<f32>() >= reflect_prob => dir,
                    _ => reflect(ray.dir.normalize(), hit.normal),
                };
                true
            }
        }
    }
}

fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    // Rejection-sample the unit ball, then project to the sphere.
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

fn reflect(dir: Vec3, normal: Vec3) -> Vec3 {
    dir - 2.0 * normal.dot(dir) * normal
}

fn refract(dir: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let dt = dir.dot(normal);
    let discriminant = 1.0 - eta * eta * (1.0 - dt * dt);
    (discriminant > 0.0).then(|| eta * (dir - normal * dt) - normal * discriminant.sqrt())
}

fn schlick(cosine: f32, ref_idx: f32) -> f32 {
    let r0 = (1.0 - ref_idx) / (1.0 + ref_idx);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powf(5.0)
}
