//! Surface trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use rand::{Rng, RngCore};
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::Material;

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// UV texture coordinates
    pub u: f64,
    pub v: f64,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t` with the given outward normal.
    pub fn new(
        ray: &Ray,
        t: f64,
        outward_normal: Vec3,
        u: f64,
        v: f64,
        material: &'a dyn Material,
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        // Normal always points against the ray
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Capability set shared by every scene entity a ray can intersect.
pub trait Surface: Send + Sync {
    /// Nearest intersection with parameter inside `ray_t`, if any.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    /// Axis-aligned bounds, or `None` for unbounded surfaces.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Solid-angle density of sampling `direction` from `origin` toward this surface.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f64 {
        0.0
    }

    /// Direction from `origin` toward a random point on this surface.
    fn random(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// A list of surfaces searched linearly.
#[derive(Clone, Default)]
pub struct SurfaceList {
    objects: Vec<Arc<dyn Surface>>,
    bbox: Option<Aabb>,
    unbounded: bool,
}

impl SurfaceList {
    /// Create a new empty surface list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<dyn Surface>) {
        match object.bounding_box() {
            Some(b) if !self.unbounded => {
                self.bbox = Some(match self.bbox {
                    Some(acc) => Aabb::surrounding(&acc, &b),
                    None => b,
                });
            }
            _ => {
                self.unbounded = true;
                self.bbox = None;
            }
        }
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Shared handles to the objects, in insertion order.
    pub fn objects(&self) -> &[Arc<dyn Surface>] {
        &self.objects
    }
}

impl FromIterator<Arc<dyn Surface>> for SurfaceList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Surface>>>(iter: I) -> Self {
        let mut list = SurfaceList::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}

impl Surface for SurfaceList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, max)) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .objects
            .iter()
            .map(|object| object.pdf_value(origin, direction))
            .sum();
        sum / self.objects.len() as f64
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let index = rng.gen_range(0..self.objects.len());
        self.objects[index].random(origin, rng)
    }
}
