//! Sphere primitive for ray tracing.

use std::f64::consts::PI;
use std::sync::Arc;

use rand::{Rng, RngCore};
use umbra_core::Perlin;
use umbra_math::{Aabb, Interval, Onb, Ray, Vec3};

use crate::hittable::{HitRecord, Surface};
use crate::sampling::{random_to_sphere, random_unit_vector};
use crate::Material;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f64, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Nearest `t` inside `ray_t` where the ray crosses the sphere.
    fn nearest_root(&self, ray: &Ray, ray_t: Interval) -> Option<f64> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        // A tangent ray only touches the surface
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let root = (h - sqrtd) / a;
        if ray_t.surrounds(root) {
            return Some(root);
        }
        let root = (h + sqrtd) / a;
        ray_t.surrounds(root).then_some(root)
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f64, f64) {
        // p is a point on the unit sphere centered at origin
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        let u = phi / (2.0 * PI);
        let v = theta / PI;
        (u, v)
    }
}

impl Surface for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let root = self.nearest_root(ray, ray_t)?;
        let outward_normal = (ray.at(root) - self.center) / self.radius;
        let (u, v) = Self::get_sphere_uv(outward_normal);
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            u,
            v,
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }

    /// Uniform density over the cone of directions the sphere subtends.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        let ray = Ray::new(origin, direction);
        if self.hit(&ray, Interval::new(0.001, f64::INFINITY)).is_none() {
            return 0.0;
        }

        let distance_squared = (self.center - origin).length_squared();
        if distance_squared <= self.radius * self.radius {
            return 1.0 / (4.0 * PI);
        }

        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        if distance_squared <= self.radius * self.radius {
            return random_unit_vector(rng);
        }

        let uvw = Onb::from_w(direction);
        uvw.local(random_to_sphere(self.radius, distance_squared, rng))
    }
}

/// A sphere whose shading normal is jittered by three Perlin fields.
///
/// Geometry, bounds and light sampling are those of the smooth sphere;
/// only the normal handed to materials is perturbed.
pub struct BumpySphere {
    sphere: Sphere,
    noise_amplitude: f64,
    noise_scale: f64,
    noise: [Perlin; 3],
}

impl BumpySphere {
    pub fn new<R: Rng + ?Sized>(
        center: Vec3,
        radius: f64,
        noise_amplitude: f64,
        noise_scale: f64,
        material: Arc<dyn Material>,
        rng: &mut R,
    ) -> Self {
        Self {
            sphere: Sphere::new(center, radius, material),
            noise_amplitude,
            noise_scale,
            noise: [Perlin::new(rng), Perlin::new(rng), Perlin::new(rng)],
        }
    }

    fn bump(&self, p: Vec3) -> Vec3 {
        let q = self.noise_scale * p;
        Vec3::new(
            self.noise[0].noise(q),
            self.noise[1].noise(q),
            self.noise[2].noise(q),
        )
    }
}

impl Surface for BumpySphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let root = self.sphere.nearest_root(ray, ray_t)?;
        let p = ray.at(root);
        let radial = (p - self.sphere.center) / self.sphere.radius;
        let outward_normal = (radial + self.noise_amplitude * self.bump(p))
            .try_normalize()
            .unwrap_or(radial);
        let (u, v) = Sphere::get_sphere_uv(radial);
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            u,
            v,
            self.sphere.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.sphere.bounding_box()
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        self.sphere.pdf_value(origin, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.sphere.random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_math::Color;

    fn grey_sphere(center: Vec3, radius: f64) -> Sphere {
        Sphere::new(
            center,
            radius,
            Arc::new(Lambertian::from_color(Color::new(0.5, 0.5, 0.5))),
        )
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = grey_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere
            .hit(&ray, Interval::new(0.001, f64::INFINITY))
            .expect("ray aimed at the center must hit");

        assert!((rec.t - 0.5).abs() < 1e-12); // Should hit at t=0.5
        assert!(rec.front_face);
    }

    #[test]
    fn test_center_hit_distance_and_normal() {
        let center = Vec3::new(3.0, -2.0, 7.0);
        let radius = 1.25;
        let sphere = grey_sphere(center, radius);

        let origins = [
            Vec3::ZERO,
            Vec3::new(10.0, 10.0, -4.0),
            Vec3::new(3.0, -2.0, 20.0),
        ];
        for origin in origins {
            // Non-unit direction: the distance is measured along the hit point
            let ray = Ray::new(origin, (center - origin) * 0.37);
            let rec = sphere.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();

            let expected = (center - origin).length() - radius;
            assert!(((rec.p - origin).length() - expected).abs() < 1e-9);

            let radial = (rec.p - center).normalize();
            assert!((rec.normal - radial).length() < 1e-9);
            assert!(ray.direction().dot(rec.normal) < 0.0);
        }
    }

    #[test]
    fn test_tangent_ray_misses() {
        let sphere = grey_sphere(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::X);
        assert!(sphere.hit(&ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_bumpy_normal_opposes_ray() {
        let mut rng = StdRng::seed_from_u64(3);
        let bumpy = BumpySphere::new(
            Vec3::new(0.0, 0.0, -4.0),
            1.0,
            0.2,
            2.0,
            Arc::new(Lambertian::from_color(Color::ONE)),
            &mut rng,
        );
        let smooth = grey_sphere(Vec3::new(0.0, 0.0, -4.0), 1.0);

        let mut perturbed = 0;
        for i in 0..200 {
            let x = (i % 20) as f64 * 0.09 - 0.9;
            let y = (i / 20) as f64 * 0.09 - 0.45;
            let ray = Ray::new(Vec3::ZERO, Vec3::new(x * 0.2, y * 0.2, -1.0));

            let rec = bumpy.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
            let flat = smooth.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();

            // Same geometry, different shading normal
            assert!((rec.t - flat.t).abs() < 1e-12);
            assert!(ray.direction().dot(rec.normal) < 0.0);
            assert!((rec.normal.length() - 1.0).abs() < 1e-9);
            if (rec.normal - flat.normal).length() > 1e-6 {
                perturbed += 1;
            }
        }
        assert!(perturbed > 100, "perturbed = {}", perturbed);
        assert_eq!(bumpy.bounding_box().unwrap().max(), smooth.bounding_box().unwrap().max());
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = grey_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, Interval::new(0.001, f64::INFINITY)).is_none());
    }

    #[test]
    fn test_hit_from_inside_is_back_face() {
        let sphere = grey_sphere(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let rec = sphere.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();

        assert!((rec.t - 2.0).abs() < 1e-12);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::X);
    }

    #[test]
    fn test_hit_behind_origin_with_open_interval() {
        let sphere = grey_sphere(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        let rec = sphere.hit(&ray, Interval::UNIVERSE).unwrap();
        assert!((rec.t + 6.0).abs() < 1e-12);
        assert!(rec.front_face);
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = Sphere::get_sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.5).abs() < 1e-12);

        let (_, v) = Sphere::get_sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pdf_matches_cone_sampling() {
        let sphere = grey_sphere(Vec3::new(0.0, 0.0, -4.0), 1.0);
        let origin = Vec3::ZERO;
        let mut rng = StdRng::seed_from_u64(21);

        let cos_theta_max = (1.0_f64 - 1.0 / 16.0).sqrt();
        let expected = 1.0 / (2.0 * PI * (1.0 - cos_theta_max));

        for _ in 0..200 {
            let d = sphere.random(origin, &mut rng);
            let value = sphere.pdf_value(origin, d);
            // Directions on the cone rim may graze past the sphere
            assert!(value == 0.0 || (value - expected).abs() < 1e-9);
        }
        assert!((sphere.pdf_value(origin, Vec3::new(0.0, 0.0, -1.0)) - expected).abs() < 1e-9);
        assert_eq!(sphere.pdf_value(origin, Vec3::new(0.0, 0.0, 1.0)), 0.0);
    }
}
