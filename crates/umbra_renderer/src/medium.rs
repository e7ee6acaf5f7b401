//! Homogeneous participating media (smoke, fog).

use std::sync::Arc;

use umbra_core::Texture;
use umbra_math::{Aabb, Color, Interval, Ray};

use crate::hittable::{HitRecord, Surface};
use crate::material::Isotropic;
use crate::sampling::hit_f64;

/// A volume of constant density filling a closed boundary surface.
///
/// A ray passing through scatters at an exponentially distributed distance;
/// if that distance lies beyond the far side of the boundary it passes through.
/// The distance is drawn from the per-thread stream in
/// [`sampling::hit_f64`](crate::sampling::hit_f64).
pub struct ConstantMedium {
    boundary: Arc<dyn Surface>,
    neg_inv_density: f64,
    phase: Isotropic,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Surface>, density: f64, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase: Isotropic::new(albedo),
        }
    }

    pub fn from_color(boundary: Arc<dyn Surface>, density: f64, albedo: Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase: Isotropic::from_color(albedo),
        }
    }
}

impl Surface for ConstantMedium {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + 0.0001, f64::INFINITY))?;

        let t_enter = entry.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * hit_f64().ln();
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            // Arbitrary for a volume, but kept opposing the ray
            normal: -ray.direction().normalize(),
            material: &self.phase,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::rect::RectBox;
    use umbra_math::Vec3;

    fn unit_cube() -> Arc<dyn Surface> {
        Arc::new(RectBox::new(
            Vec3::ZERO,
            Vec3::ONE,
            Arc::new(Lambertian::from_color(Color::ONE)),
        ))
    }

    #[test]
    fn test_dense_medium_scatters_near_entry() {
        let fog = ConstantMedium::from_color(unit_cube(), 1e6, Color::splat(0.5));
        let ray = Ray::new(Vec3::new(0.5, 0.5, -4.0), Vec3::Z);

        let rec = fog.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!(rec.t >= 4.0 && rec.t < 4.01);
        assert!(rec.front_face);
        assert!(ray.direction().dot(rec.normal) < 0.0);
    }

    #[test]
    fn test_thin_medium_mostly_transmits() {
        let fog = ConstantMedium::from_color(unit_cube(), 1e-4, Color::splat(0.5));
        let ray = Ray::new(Vec3::new(0.5, 0.5, -4.0), Vec3::Z);

        let hits = (0..1000)
            .filter(|_| fog.hit(&ray, Interval::new(0.001, f64::INFINITY)).is_some())
            .count();
        assert!(hits < 20, "hits = {}", hits);
    }

    #[test]
    fn test_mean_free_path() {
        // Density 2 inside a deep box: mean free path 0.5
        let deep: Arc<dyn Surface> = Arc::new(RectBox::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 100.0),
            Arc::new(Lambertian::from_color(Color::ONE)),
        ));
        let fog = ConstantMedium::from_color(deep, 2.0, Color::ONE);
        // Non-unit direction: distances are in world units, t is not
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0));

        let samples = 20_000;
        let total: f64 = (0..samples)
            .map(|_| {
                let rec = fog.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
                rec.p.z
            })
            .sum();
        let mean = total / samples as f64;
        assert!((mean - 0.5).abs() < 0.03, "mean = {}", mean);
    }

    #[test]
    fn test_ray_starting_inside_medium() {
        let fog = ConstantMedium::from_color(unit_cube(), 1e6, Color::ONE);
        let ray = Ray::new(Vec3::splat(0.5), Vec3::X);

        let rec = fog.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!(rec.t < 0.01);
    }

    #[test]
    fn test_bounding_box_matches_boundary() {
        let fog = ConstantMedium::from_color(unit_cube(), 0.01, Color::ONE);
        assert_eq!(fog.bounding_box().unwrap().max(), Vec3::ONE);
    }
}
