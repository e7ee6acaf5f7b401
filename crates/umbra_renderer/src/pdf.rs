//! Direction sampling distributions for importance-sampled scattering.

use std::f64::consts::PI;

use rand::RngCore;
use umbra_math::{Onb, Vec3};

use crate::sampling::{gen_f64, random_cosine_direction, random_unit_vector};
use crate::Surface;

/// A probability density over outgoing directions.
///
/// `value` must agree with the distribution `generate` draws from.
pub trait Pdf {
    fn value(&self, direction: Vec3) -> f64;
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Uniform density over the whole sphere of directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpherePdf;

impl Pdf for SpherePdf {
    fn value(&self, _direction: Vec3) -> f64 {
        1.0 / (4.0 * PI)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        random_unit_vector(rng)
    }
}

/// Cosine-weighted hemisphere around a normal.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::from_w(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f64 {
        let cosine = direction.normalize().dot(self.uvw.w());
        (cosine / PI).max(0.0)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(random_cosine_direction(rng))
    }
}

/// Directions from `origin` toward a surface, using its sampling hooks.
pub struct SurfacePdf<'a> {
    surface: &'a dyn Surface,
    origin: Vec3,
}

impl<'a> SurfacePdf<'a> {
    pub fn new(surface: &'a dyn Surface, origin: Vec3) -> Self {
        Self { surface, origin }
    }
}

impl Pdf for SurfacePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        self.surface.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.surface.random(self.origin, rng)
    }
}

/// Two-component mixture: `weight * first + (1 - weight) * second`.
pub struct MixturePdf<'a> {
    first: &'a dyn Pdf,
    second: &'a dyn Pdf,
    weight: f64,
}

impl<'a> MixturePdf<'a> {
    /// Mix two densities. `weight` is the probability of sampling `first`
    /// and is clamped to [0, 1].
    pub fn new(first: &'a dyn Pdf, second: &'a dyn Pdf, weight: f64) -> Self {
        Self {
            first,
            second,
            weight: weight.clamp(0.0, 1.0),
        }
    }

    /// Equal-weight mixture.
    pub fn even(first: &'a dyn Pdf, second: &'a dyn Pdf) -> Self {
        Self::new(first, second, 0.5)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        self.weight * self.first.value(direction)
            + (1.0 - self.weight) * self.second.value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f64(rng) < self.weight {
            self.first.generate(rng)
        } else {
            self.second.generate(rng)
        }
    }
}
