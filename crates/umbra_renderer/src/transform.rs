//! Instance transforms wrapping a child surface.
//!
//! Rays are moved into the child's object space, and hits are moved back.

use std::sync::Arc;

use rand::RngCore;
use umbra_math::{Aabb, Interval, Mat4, Mat4Ext, Quat, Ray, Vec3};

use crate::hittable::{HitRecord, Surface};

/// Child surface displaced by a fixed offset.
pub struct Translate {
    child: Arc<dyn Surface>,
    offset: Vec3,
    bbox: Option<Aabb>,
}

impl Translate {
    pub fn new(child: Arc<dyn Surface>, offset: Vec3) -> Self {
        let bbox = child.bounding_box().map(|b| b.translate(offset));
        Self {
            child,
            offset,
            bbox,
        }
    }
}

impl Surface for Translate {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction());
        let mut rec = self.child.hit(&moved, ray_t)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        self.child.pdf_value(origin - self.offset, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.child.random(origin - self.offset, rng)
    }
}

/// Child surface rotated about the origin.
pub struct Rotate {
    child: Arc<dyn Surface>,
    rotation: Quat,
    inverse: Quat,
    bbox: Option<Aabb>,
}

impl Rotate {
    pub fn new(child: Arc<dyn Surface>, rotation: Quat) -> Self {
        let rotation = rotation.normalize();
        let bbox = child
            .bounding_box()
            .map(|b| Mat4::from_quat(rotation).transform_aabb(&b));

        Self {
            child,
            rotation,
            inverse: rotation.inverse(),
            bbox,
        }
    }

    /// Rotate about the +Y axis by `degrees`.
    pub fn y(child: Arc<dyn Surface>, degrees: f64) -> Self {
        Self::new(child, Quat::from_rotation_y(degrees.to_radians()))
    }
}

impl Surface for Rotate {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let local = Ray::new(
            self.inverse * ray.origin(),
            self.inverse * ray.direction(),
        );

        // Rotation preserves the normal/direction dot product, so front_face carries over
        let mut rec = self.child.hit(&local, ray_t)?;
        rec.p = self.rotation * rec.p;
        rec.normal = self.rotation * rec.normal;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        self.child
            .pdf_value(self.inverse * origin, self.inverse * direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.rotation * self.child.random(self.inverse * origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::rect::RectBox;
    use crate::Sphere;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_math::Color;

    fn unit_box() -> Arc<dyn Surface> {
        Arc::new(RectBox::new(
            Vec3::ZERO,
            Vec3::ONE,
            Arc::new(Lambertian::from_color(Color::splat(0.5))),
        ))
    }

    #[test]
    fn test_translate_moves_hit_point() {
        let moved = Translate::new(unit_box(), Vec3::new(10.0, 0.0, 0.0));
        let ray = Ray::new(Vec3::new(10.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let rec = moved.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-12);
        assert!((rec.p - Vec3::new(10.5, 0.5, 1.0)).length() < 1e-12);

        let bbox = moved.bounding_box().unwrap();
        assert_eq!(bbox.min(), Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        // Box spanning x in [0,1] turns into z in [-1,0] after +90° about Y
        let rotated = Rotate::y(unit_box(), 90.0);
        let bbox = rotated.bounding_box().unwrap();
        assert!((bbox.z.min + 1.0).abs() < 1e-9);
        assert!(bbox.z.max.abs() < 1e-9);

        // Exit through the rotated far face from inside
        let ray = Ray::new(Vec3::new(0.5, 0.5, -0.5), Vec3::X);
        let rec = rotated.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((rec.p - Vec3::new(1.0, 0.5, -0.5)).length() < 1e-9);
        assert!(!rec.front_face);
        assert!(ray.direction().dot(rec.normal) < 0.0);
    }

    #[test]
    fn test_rotate_preserves_normal_orientation() {
        let rotated = Rotate::y(unit_box(), 30.0);
        let bbox = rotated.bounding_box().unwrap();
        let center = (bbox.min() + bbox.max()) * 0.5;
        let mut rng = StdRng::seed_from_u64(41);

        for _ in 0..200 {
            let origin = Vec3::new(0.3, 0.5, 8.0);
            let jitter = crate::sampling::random_in_unit_sphere(&mut rng) * 0.3;
            let ray = Ray::new(origin, center + jitter - origin);
            if let Some(rec) = rotated.hit(&ray, Interval::new(0.001, f64::INFINITY)) {
                assert!(ray.direction().dot(rec.normal) < 0.0);
                assert!(rec.front_face);
            }
        }
    }

    #[test]
    fn test_transformed_light_sampling_round_trips() {
        let light: Arc<dyn Surface> = Arc::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Lambertian::from_color(Color::ONE)),
        ));
        let moved = Translate::new(light, Vec3::new(0.0, 0.0, -5.0));
        let turned = Rotate::y(Arc::new(moved), 45.0);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let d = turned.random(Vec3::ZERO, &mut rng);
            assert!(turned.pdf_value(Vec3::ZERO, d) >= 0.0);
        }

        // Straight at the sphere's new center
        let center = Quat::from_rotation_y(45f64.to_radians()) * Vec3::new(0.0, 0.0, -5.0);
        assert!(turned.pdf_value(Vec3::ZERO, center) > 0.0);
    }
}
