//! Axis-aligned rectangles and the boxes built from them.

use std::sync::Arc;

use rand::{Rng, RngCore};
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Surface, SurfaceList};
use crate::Material;

/// Which coordinate plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// Indices of the two in-plane axes and the normal axis.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// A rectangle in a coordinate plane at offset `k` along the normal axis.
pub struct AxisRect {
    plane: Plane,
    a: Interval,
    b: Interval,
    k: f64,
    normal_sign: f64,
    material: Arc<dyn Material>,
}

impl AxisRect {
    /// Rectangle spanning `a` and `b` on the plane's two in-plane axes,
    /// with its outward normal along the positive normal axis.
    pub fn new(plane: Plane, a: (f64, f64), b: (f64, f64), k: f64, material: Arc<dyn Material>) -> Self {
        Self {
            plane,
            a: Interval::new(a.0.min(a.1), a.0.max(a.1)),
            b: Interval::new(b.0.min(b.1), b.0.max(b.1)),
            k,
            normal_sign: 1.0,
            material,
        }
    }

    pub fn xy(x0: f64, x1: f64, y0: f64, y1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XY, (x0, x1), (y0, y1), k, material)
    }

    pub fn xz(x0: f64, x1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XZ, (x0, x1), (z0, z1), k, material)
    }

    pub fn yz(y0: f64, y1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::YZ, (y0, y1), (z0, z1), k, material)
    }

    /// Point the outward normal along the negative normal axis.
    pub fn flipped(mut self) -> Self {
        self.normal_sign = -self.normal_sign;
        self
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn outward_normal(&self) -> Vec3 {
        let (_, _, n) = self.plane.axes();
        let mut normal = Vec3::ZERO;
        normal[n] = self.normal_sign;
        normal
    }

    pub fn area(&self) -> f64 {
        self.a.size() * self.b.size()
    }
}

impl Surface for AxisRect {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let (ia, ib, n) = self.plane.axes();

        let t = (self.k - ray.origin()[n]) / ray.direction()[n];
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        if !self.a.contains(p[ia]) || !self.b.contains(p[ib]) {
            return None;
        }

        let u = (p[ia] - self.a.min) / self.a.size();
        let v = (p[ib] - self.b.min) / self.b.size();
        Some(HitRecord::new(
            ray,
            t,
            self.outward_normal(),
            u,
            v,
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let (ia, ib, n) = self.plane.axes();
        let mut lo = Vec3::ZERO;
        let mut hi = Vec3::ZERO;
        lo[ia] = self.a.min;
        hi[ia] = self.a.max;
        lo[ib] = self.b.min;
        hi[ib] = self.b.max;
        lo[n] = self.k;
        hi[n] = self.k;
        // Zero thickness along the normal axis is padded by the constructor
        Some(Aabb::from_points(lo, hi))
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        let ray = Ray::new(origin, direction);
        let Some(rec) = self.hit(&ray, Interval::new(0.001, f64::INFINITY)) else {
            return 0.0;
        };

        let length = direction.length();
        let distance_squared = rec.t * rec.t * length * length;
        let cosine = (direction.dot(rec.normal) / length).abs();
        if cosine <= 0.0 {
            return 0.0;
        }

        distance_squared / (cosine * self.area())
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let (ia, ib, n) = self.plane.axes();
        let mut point = Vec3::ZERO;
        point[ia] = self.a.min + rng.gen::<f64>() * self.a.size();
        point[ib] = self.b.min + rng.gen::<f64>() * self.b.size();
        point[n] = self.k;
        point - origin
    }
}

/// An axis-aligned box made of six outward-facing rectangles.
pub struct RectBox {
    min: Vec3,
    max: Vec3,
    sides: SurfaceList,
}

impl RectBox {
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Self {
        let min = p0.min(p1);
        let max = p0.max(p1);

        let mut sides = SurfaceList::new();
        let mut add = |rect: AxisRect| sides.add(Arc::new(rect));

        add(AxisRect::xy(min.x, max.x, min.y, max.y, min.z, material.clone()).flipped());
        add(AxisRect::xy(min.x, max.x, min.y, max.y, max.z, material.clone()));

        add(AxisRect::xz(min.x, max.x, min.z, max.z, min.y, material.clone()).flipped());
        add(AxisRect::xz(min.x, max.x, min.z, max.z, max.y, material.clone()));

        add(AxisRect::yz(min.y, max.y, min.z, max.z, min.x, material.clone()).flipped());
        add(AxisRect::yz(min.y, max.y, min.z, max.z, max.x, material));

        Self { min, max, sides }
    }
}

impl Surface for RectBox {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(self.min, self.max))
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        self.sides.pdf_value(origin, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.sides.random(origin, rng)
    }
}
