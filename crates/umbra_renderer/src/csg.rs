//! Constructive solid geometry.
//!
//! A composite collects each child's crossings along the ray into sorted
//! `(enter, exit)` spans, combines the two span lists with the boolean
//! operation and reports the first resulting boundary inside the query range.
//!
//! Both children must be closed, manifold solids: along any ray their
//! crossings alternate strictly between entering and exiting. A child that
//! breaks this is a scene defect and aborts the render.

use std::cmp::Ordering;
use std::sync::Arc;

use umbra_math::{Aabb, Interval, Ray};

use crate::error::{RenderError, RenderResult};
use crate::hittable::{HitRecord, Surface};

/// How far past the previous crossing a child is re-queried.
const REQUERY_EPSILON: f64 = 1e-4;

/// Crossings whose normal is this close to perpendicular to the ray only
/// touch the surface and are skipped.
const GRAZING_COSINE: f64 = 1e-9;

/// Boolean operation combining two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgOp {
    /// Points in `a` but not in `b`.
    Difference,
    /// Points in both.
    Intersection,
    /// Points in either.
    Fusion,
}

/// A ray's stay inside a solid: the crossing where it enters and the one
/// where it leaves.
#[derive(Clone)]
pub(crate) struct Span<'a> {
    pub enter: HitRecord<'a>,
    pub exit: HitRecord<'a>,
}

/// Boolean combination of two surfaces.
pub struct Csg {
    op: CsgOp,
    a: Arc<dyn Surface>,
    b: Arc<dyn Surface>,
}

impl Csg {
    pub fn new(op: CsgOp, a: Arc<dyn Surface>, b: Arc<dyn Surface>) -> Self {
        Self { op, a, b }
    }

    /// `a` with `b` carved out of it.
    pub fn difference(a: Arc<dyn Surface>, b: Arc<dyn Surface>) -> Self {
        Self::new(CsgOp::Difference, a, b)
    }

    pub fn intersection(a: Arc<dyn Surface>, b: Arc<dyn Surface>) -> Self {
        Self::new(CsgOp::Intersection, a, b)
    }

    pub fn fusion(a: Arc<dyn Surface>, b: Arc<dyn Surface>) -> Self {
        Self::new(CsgOp::Fusion, a, b)
    }

    /// Spans of the composite along the whole ray, ordered by `t`.
    pub(crate) fn spans<'a>(&'a self, ray: &Ray) -> RenderResult<Vec<Span<'a>>> {
        let a = collect_spans(self.a.as_ref(), ray)?;
        let b = collect_spans(self.b.as_ref(), ray)?;

        Ok(match self.op {
            CsgOp::Difference => difference(a, b),
            CsgOp::Intersection => intersection(a, b),
            CsgOp::Fusion => fusion(a, b),
        })
    }
}

impl Surface for Csg {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let spans = match self.spans(ray) {
            Ok(spans) => spans,
            // Unrecoverable: the scheduler turns this into a failed render
            Err(err) => panic!("{}", err),
        };

        for span in spans {
            if ray_t.surrounds(span.enter.t) {
                return Some(span.enter);
            }
            if ray_t.surrounds(span.exit.t) {
                return Some(span.exit);
            }
        }
        None
    }

    fn bounding_box(&self) -> Option<Aabb> {
        match self.op {
            CsgOp::Difference => self.a.bounding_box(),
            CsgOp::Intersection => {
                let a = self.a.bounding_box()?;
                let b = self.b.bounding_box()?;
                // Disjoint boxes leave an empty solid; any box inside `a` bounds it
                Some(Aabb::overlap(&a, &b).unwrap_or(a))
            }
            CsgOp::Fusion => {
                let a = self.a.bounding_box()?;
                let b = self.b.bounding_box()?;
                Some(Aabb::surrounding(&a, &b))
            }
        }
    }
}

/// Walk every crossing of `surface` along the ray, starting from `t = -∞`.
///
/// Consecutive crossings must alternate between entering and exiting.
/// Tangent touches neither enter nor leave the solid and are ignored.
pub(crate) fn collect_spans<'a>(surface: &'a dyn Surface, ray: &Ray) -> RenderResult<Vec<Span<'a>>> {
    let mut spans = Vec::new();
    let mut previous_t = f64::NEG_INFINITY;
    let mut previous_front = false;
    let mut enter: Option<HitRecord<'a>> = None;

    let direction = ray.direction().normalize();

    while let Some(rec) = surface.hit(ray, Interval::new(previous_t + REQUERY_EPSILON, f64::INFINITY)) {
        if direction.dot(rec.normal).abs() < GRAZING_COSINE {
            previous_t = rec.t;
            continue;
        }
        if rec.front_face == previous_front {
            return Err(RenderError::NonManifold {
                t: rec.t,
                front_face: rec.front_face,
            });
        }
        previous_t = rec.t;
        previous_front = rec.front_face;

        if rec.front_face {
            enter = Some(rec);
        } else if let Some(enter) = enter.take() {
            spans.push(Span { enter, exit: rec });
        }
    }

    Ok(spans)
}

/// Boundaries taken from the subtracted solid swap sides.
fn flipped(mut rec: HitRecord<'_>) -> HitRecord<'_> {
    rec.front_face = !rec.front_face;
    rec
}

fn difference<'a>(a: Vec<Span<'a>>, b: Vec<Span<'a>>) -> Vec<Span<'a>> {
    let mut result = Vec::new();
    let mut j = 0;

    for span in a {
        let mut start = span.enter;
        let end = span.exit;

        while j < b.len() {
            let cut = &b[j];
            if cut.exit.t < start.t {
                j += 1;
                continue;
            }
            if cut.enter.t > end.t {
                break;
            }

            if cut.enter.t >= start.t {
                result.push(Span {
                    enter: start,
                    exit: flipped(cut.enter.clone()),
                });
            }
            start = flipped(cut.exit.clone());
            // The cut may reach into the next span of `a`
            if cut.exit.t > end.t {
                break;
            }
            j += 1;
        }

        if end.t > start.t {
            result.push(Span { enter: start, exit: end });
        }
    }

    result
}

fn intersection<'a>(a: Vec<Span<'a>>, b: Vec<Span<'a>>) -> Vec<Span<'a>> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (x, y) = (&a[i], &b[j]);

        let enter = if x.enter.t >= y.enter.t { &x.enter } else { &y.enter };
        let exit = if x.exit.t <= y.exit.t { &x.exit } else { &y.exit };
        if enter.t < exit.t {
            result.push(Span {
                enter: enter.clone(),
                exit: exit.clone(),
            });
        }

        // Drop whichever span ends first
        if x.exit.t <= y.exit.t {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}

fn fusion<'a>(a: Vec<Span<'a>>, b: Vec<Span<'a>>) -> Vec<Span<'a>> {
    let mut all: Vec<Span<'a>> = a.into_iter().chain(b).collect();
    all.sort_by(|x, y| x.enter.t.partial_cmp(&y.enter.t).unwrap_or(Ordering::Equal));

    let mut result: Vec<Span<'a>> = Vec::with_capacity(all.len());
    for span in all {
        if let Some(last) = result.last_mut() {
            if span.enter.t <= last.exit.t {
                if span.exit.t > last.exit.t {
                    last.exit = span.exit;
                }
                continue;
            }
        }
        result.push(span);
    }

    result
}
