//! Random direction and point generators shared by materials, PDFs and the camera.

use std::cell::RefCell;
use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, UnitBall, UnitDisc, UnitSphere};
use umbra_math::Vec3;

thread_local! {
    static HIT_RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

/// Restart this thread's stream for random draws made inside
/// [`Surface::hit`](crate::Surface::hit), which has no generator parameter.
///
/// The renderer reseeds it at the start of every scanline.
pub fn reseed_hit_rng(seed: u64) {
    HIT_RNG.with(|rng| *rng.borrow_mut() = StdRng::seed_from_u64(seed));
}

/// Uniform float in [0, 1) from this thread's hit stream.
pub fn hit_f64() -> f64 {
    HIT_RNG.with(|rng| rng.borrow_mut().gen())
}

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform point inside the unit ball.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::from_array(UnitBall.sample(rng))
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::from_array(UnitSphere.sample(rng))
}

/// Uniform point inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    let [x, y]: [f64; 2] = UnitDisc.sample(rng);
    Vec3::new(x, y, 0.0)
}

/// Cosine-weighted direction on the +Z hemisphere.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f64(rng);
    let r2 = gen_f64(rng);

    let phi = 2.0 * PI * r1;
    let x = phi.cos() * r2.sqrt();
    let y = phi.sin() * r2.sqrt();
    let z = (1.0 - r2).sqrt();

    Vec3::new(x, y, z)
}

/// Direction (around +Z) uniformly inside the cone subtended by a sphere of
/// `radius` whose center is `distance_squared` away.
pub fn random_to_sphere(radius: f64, distance_squared: f64, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f64(rng);
    let r2 = gen_f64(rng);
    let cos_theta_max = (1.0 - radius * radius / distance_squared).max(0.0).sqrt();
    let z = 1.0 + r2 * (cos_theta_max - 1.0);

    let phi = 2.0 * PI * r1;
    let sin_theta = (1.0 - z * z).max(0.0).sqrt();

    Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, z)
}
