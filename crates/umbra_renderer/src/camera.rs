//! Camera for ray generation.

use rand::RngCore;
use umbra_math::{Ray, Vec3};

use crate::sampling::random_in_unit_disk;

/// Where the camera sits and how its lens is shaped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f64,
    /// Distance from camera to plane of perfect focus
    pub focus_distance: f64,
}

impl CameraConfig {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, up: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.up = up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_distance: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_distance = focus_distance;
        self
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_distance: 1.0,
        }
    }
}

/// Thin-lens camera generating rays through a viewport on the focus plane.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect_ratio: f64) -> Self {
        // Calculate viewport dimensions
        let theta = config.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at).normalize();
        let u = config.up.cross(w).normalize();
        let v = w.cross(u);

        let origin = config.look_from;
        let horizontal = config.focus_distance * viewport_width * u;
        let vertical = config.focus_distance * viewport_height * v;
        let lower_left_corner =
            origin - horizontal / 2.0 - vertical / 2.0 - config.focus_distance * w;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: config.aperture / 2.0,
        }
    }

    /// Ray through viewport coordinates `(s, t)` in [0, 1], `t = 0` at the bottom edge.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin)
    }

    /// Direction the camera looks along.
    pub fn forward(&self) -> Vec3 {
        -self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_basis() {
        let camera = Camera::new(&CameraConfig::default(), 4.0 / 3.0);

        assert_eq!(camera.origin, Vec3::ZERO);
        assert!((camera.forward() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
        assert!((camera.horizontal.length() / camera.vertical.length() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_pinhole_rays() {
        let camera = Camera::new(&CameraConfig::default(), 1.0);
        let mut rng = StdRng::seed_from_u64(42);

        // Center ray points straight down -Z
        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((ray.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);

        // 90° field of view: corners sit at 45° on both axes
        let ray = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((ray.direction() - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-12);

        let ray = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((ray.direction() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_thin_lens_rays_converge_on_focus_plane() {
        let config = CameraConfig::default()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_lens(40.0, 0.5, 5.0);
        let camera = Camera::new(&config, 1.0);
        let mut rng = StdRng::seed_from_u64(7);

        let mut focus_point = None;
        for _ in 0..50 {
            let ray = camera.get_ray(0.3, 0.6, &mut rng);
            assert!((ray.origin() - config.look_from).length() <= 0.25 + 1e-12);
            assert!(ray.origin().z == 5.0);

            // Every ray passes through the same point on the focus plane (z = 0)
            let p = ray.at(-ray.origin().z / ray.direction().z);
            match focus_point {
                None => focus_point = Some(p),
                Some(q) => assert!((p - q).length() < 1e-9),
            }
        }
    }
}
