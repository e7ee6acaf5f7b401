//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over shared surfaces. Each node splits on an axis chosen
//! uniformly at random and divides its objects at the median of their box
//! minimum along that axis.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::{Rng, RngCore};
use umbra_math::{Aabb, Interval, Ray};

use crate::error::{RenderError, RenderResult};
use crate::hittable::{HitRecord, Surface};

/// Interior node of the hierarchy. A single-object node aliases the same
/// surface on both sides.
pub struct BvhNode {
    left: Arc<dyn Surface>,
    right: Arc<dyn Surface>,
    bbox: Aabb,
}

type Bounded = (Arc<dyn Surface>, Aabb);

impl BvhNode {
    /// Build a hierarchy over `objects`.
    ///
    /// Fails if the list is empty or any object is unbounded.
    pub fn new(objects: Vec<Arc<dyn Surface>>, rng: &mut dyn RngCore) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let count = objects.len();
        let bounded = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| match object.bounding_box() {
                Some(bbox) => Ok((object, bbox)),
                None => Err(RenderError::MissingBoundingBox { index }),
            })
            .collect::<RenderResult<Vec<Bounded>>>()?;

        let node = Self::build(bounded, rng);
        log::debug!("Built BVH over {} objects", count);
        Ok(node)
    }

    /// Recursive BVH construction. `objects` is never empty.
    fn build(mut objects: Vec<Bounded>, rng: &mut dyn RngCore) -> Self {
        let axis = rng.gen_range(0..3);
        let key = |item: &Bounded| item.1.axis_interval(axis).min;
        let compare =
            |a: &Bounded, b: &Bounded| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);

        let (left, left_box, right, right_box) = match objects.len() {
            1 => {
                let (object, bbox) = objects.swap_remove(0);
                (object.clone(), bbox, object, bbox)
            }
            2 => {
                let second = objects.swap_remove(1);
                let first = objects.swap_remove(0);
                let (a, b) = if compare(&first, &second) == Ordering::Less {
                    (first, second)
                } else {
                    (second, first)
                };
                (a.0, a.1, b.0, b.1)
            }
            n => {
                objects.sort_unstable_by(compare);

                // Split at midpoint
                let right_objects = objects.split_off(n / 2);
                let left = Self::build(objects, rng);
                let right = Self::build(right_objects, rng);
                let (left_box, right_box) = (left.bbox, right.bbox);
                (
                    Arc::new(left) as Arc<dyn Surface>,
                    left_box,
                    Arc::new(right) as Arc<dyn Surface>,
                    right_box,
                )
            }
        };

        Self {
            left,
            right,
            bbox: Aabb::surrounding(&left_box, &right_box),
        }
    }
}

impl Surface for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let left = self.left.hit(ray, ray_t);

        // Only check right up to closest hit
        let right_max = left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let right = self.right.hit(ray, Interval::new(ray_t.min, right_max));

        right.or(left)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}
