//! Scene assembly and the render entry point.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use umbra_math::Color;

use crate::bvh::BvhNode;
use crate::camera::{Camera, CameraConfig};
use crate::error::{RenderError, RenderResult};
use crate::hittable::{Surface, SurfaceList};
use crate::progress::{format_hms, Progress};
use crate::renderer::{render_pixel, ImageBuffer, RenderConfig};
use crate::sampling::reseed_hit_rng;
use crate::scheduler::WorkPool;

/// Everything needed to render one image.
///
/// Objects are frozen into a BVH when [`Scene::render`] starts; `lights`
/// only steers importance sampling, so anything in it that should also be
/// visible must be added with [`Scene::add`] too.
pub struct Scene {
    objects: Vec<Arc<dyn Surface>>,
    lights: SurfaceList,
    pub camera: CameraConfig,
    /// Constant color for escaped rays; `None` uses the sky gradient
    pub background: Option<Color>,
    pub image_width: u32,
    pub aspect_ratio: f64,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub threads: usize,
    pub seed: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            lights: SurfaceList::new(),
            camera: CameraConfig::default(),
            background: None,
            image_width: 100,
            aspect_ratio: 1.0,
            samples_per_pixel: 10,
            max_depth: 50,
            threads: 4,
            seed: 0,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Arc<dyn Surface>) {
        self.objects.push(object);
    }

    /// Register a surface as a target for light sampling.
    pub fn add_light(&mut self, light: Arc<dyn Surface>) {
        self.lights.add(light);
    }

    pub fn objects(&self) -> &[Arc<dyn Surface>] {
        &self.objects
    }

    pub fn lights(&self) -> &SurfaceList {
        &self.lights
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    pub fn with_image_width(mut self, width: u32) -> Self {
        self.image_width = width;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_samples_per_pixel(mut self, samples: u32) -> Self {
        self.samples_per_pixel = samples;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Image height derived from width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f64 / self.aspect_ratio) as u32).max(1)
    }

    /// Check the settings and derive the per-pixel configuration.
    pub fn render_config(&self) -> RenderResult<RenderConfig> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));

        if self.image_width == 0 {
            return invalid("image width must be at least 1");
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return invalid("aspect ratio must be a positive number");
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be at least 1");
        }
        if self.threads == 0 {
            return invalid("thread count must be at least 1");
        }

        Ok(RenderConfig {
            image_width: self.image_width,
            image_height: self.image_height(),
            samples_per_pixel: self.samples_per_pixel,
            max_depth: self.max_depth,
            background: self.background,
        })
    }

    /// Render the scene.
    ///
    /// Scanlines are handed to the worker pool in shuffled order; every row
    /// draws from its own generator so the image does not depend on the
    /// thread count.
    pub fn render(&self) -> RenderResult<ImageBuffer> {
        let config = self.render_config()?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let world = BvhNode::new(self.objects.clone(), &mut rng)?;
        let lights: Option<&dyn Surface> = if self.lights.is_empty() {
            None
        } else {
            Some(&self.lights)
        };
        let camera = Camera::new(&self.camera, self.aspect_ratio);

        log::info!(
            "Rendering {}x{} with {} samples per pixel, max depth {}, {} threads",
            config.image_width,
            config.image_height,
            config.samples_per_pixel,
            config.max_depth,
            self.threads
        );

        let mut image = ImageBuffer::new(config.image_width, config.image_height);
        let mut rows: Vec<(u32, &mut [Color])> = image
            .pixels
            .chunks_mut(config.image_width as usize)
            .enumerate()
            .map(|(y, row)| (y as u32, row))
            .collect();
        rows.shuffle(&mut rng);

        let progress = Progress::new(rows.len());
        WorkPool::new(rows).run(
            self.threads,
            |(y, row)| {
                let mut rng = row_rng(self.seed, y);
                reseed_hit_rng(rng.gen());
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = render_pixel(&camera, &world, lights, x as u32, y, &config, &mut rng);
                }
            },
            |remaining| progress.report(remaining),
        )?;

        log::info!("Render finished in {}", format_hms(progress.elapsed()));
        Ok(image)
    }
}

/// Generator for one scanline, derived from the scene seed and row index.
pub(crate) fn row_rng(seed: u64, row: u32) -> StdRng {
    let mix = (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed ^ mix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::Csg;
    use crate::material::Lambertian;
    use crate::medium::ConstantMedium;
    use crate::rect::AxisRect;
    use crate::renderer::{ray_color, sky_gradient};
    use crate::sampling::gen_f64;
    use crate::sphere::Sphere;
    use umbra_math::Vec3;

    fn single_sphere_scene() -> Scene {
        let mut scene = Scene::new()
            .with_image_width(20)
            .with_samples_per_pixel(4)
            .with_max_depth(1)
            .with_threads(3)
            .with_seed(11);
        scene.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::from_color(Color::splat(0.5))),
        )));
        scene
    }

    #[test]
    fn test_defaults() {
        let scene = Scene::new();
        assert_eq!(scene.image_width, 100);
        assert_eq!(scene.image_height(), 100);
        assert_eq!(scene.samples_per_pixel, 10);
        assert_eq!(scene.max_depth, 50);
        assert_eq!(scene.threads, 4);
        assert!(scene.background.is_none());
    }

    #[test]
    fn test_image_height_from_aspect() {
        let scene = Scene::new().with_image_width(400).with_aspect_ratio(16.0 / 9.0);
        assert_eq!(scene.image_height(), 225);

        let sliver = Scene::new().with_image_width(3).with_aspect_ratio(10.0);
        assert_eq!(sliver.image_height(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut scene = single_sphere_scene().with_image_width(0);
        assert!(matches!(scene.render(), Err(RenderError::InvalidConfig(_))));

        scene = single_sphere_scene().with_samples_per_pixel(0);
        assert!(matches!(scene.render(), Err(RenderError::InvalidConfig(_))));

        scene = single_sphere_scene().with_aspect_ratio(0.0);
        assert!(matches!(scene.render(), Err(RenderError::InvalidConfig(_))));

        scene = single_sphere_scene().with_threads(0);
        assert!(matches!(scene.render(), Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_scene_rejected() {
        assert!(matches!(Scene::new().render(), Err(RenderError::EmptyScene)));
    }

    #[test]
    fn test_top_row_is_exact_sky() {
        let scene = single_sphere_scene();
        let image = scene.render().unwrap();
        assert_eq!((image.width, image.height), (20, 20));

        // The top row never reaches the sphere, so every sample is sky
        let camera = Camera::new(&scene.camera, scene.aspect_ratio);
        let mut rng = row_rng(scene.seed, 0);
        for x in 0..20 {
            let mut expected = Color::ZERO;
            for _ in 0..scene.samples_per_pixel {
                let s = (x as f64 + gen_f64(&mut rng)) / 19.0;
                let t = (19.0 + gen_f64(&mut rng)) / 19.0;
                expected += sky_gradient(&camera.get_ray(s, t, &mut rng));
            }
            expected /= scene.samples_per_pixel as f64;
            assert_eq!(image.get(x, 0), expected, "pixel ({}, 0)", x);
        }
    }

    #[test]
    fn test_center_pixel_is_dimmed_sky() {
        let image = single_sphere_scene().render().unwrap();
        let center = image.get(10, 10);

        // One diffuse bounce at albedo 0.5: blue channel of the sky is 1.0
        assert!((center.z - 0.5).abs() < 1e-9, "center = {:?}", center);
        assert!(center.x > 0.2 && center.x < 0.5 + 1e-9);
        assert!(center.y > 0.3 && center.y < 0.5 + 1e-9);
    }

    #[test]
    fn test_output_independent_of_thread_count() {
        let one = single_sphere_scene().with_threads(1).with_max_depth(5).render().unwrap();
        let many = single_sphere_scene().with_threads(8).with_max_depth(5).render().unwrap();
        assert_eq!(one.pixels, many.pixels);
    }

    #[test]
    fn test_medium_output_independent_of_thread_count() {
        let smoke = |threads| {
            let mut scene = Scene::new()
                .with_image_width(16)
                .with_samples_per_pixel(2)
                .with_max_depth(4)
                .with_background(Some(Color::ONE))
                .with_threads(threads)
                .with_seed(5);
            let boundary = Arc::new(Sphere::new(
                Vec3::new(0.0, 0.0, -1.0),
                0.5,
                Arc::new(Lambertian::from_color(Color::ONE)),
            ));
            scene.add(Arc::new(ConstantMedium::from_color(boundary, 2.0, Color::splat(0.8))));
            scene.render().unwrap()
        };

        let one = smoke(1);
        let many = smoke(6);
        assert_eq!(one.pixels, many.pixels);
        // Some rays did scatter in the smoke
        assert!(one.pixels.iter().any(|c| c.x < 1.0));
    }

    #[test]
    fn test_constant_background() {
        let scene = single_sphere_scene().with_background(Some(Color::new(0.1, 0.2, 0.3)));
        let image = scene.render().unwrap();
        assert!((image.get(0, 0) - Color::new(0.1, 0.2, 0.3)).length() < 1e-12);
    }

    #[test]
    fn test_light_sampling_scene_renders() {
        let mut scene = single_sphere_scene()
            .with_background(Some(Color::ZERO))
            .with_samples_per_pixel(16)
            .with_max_depth(4);
        let light: Arc<dyn Surface> = Arc::new(Sphere::new(
            Vec3::new(0.0, 2.0, -1.0),
            0.5,
            Arc::new(crate::material::DiffuseLight::from_color(Color::splat(4.0))),
        ));
        scene.add(light.clone());
        scene.add_light(light);

        let image = scene.render().unwrap();
        assert!(image.pixels.iter().all(|c| c.is_finite()));
        // Top of the diffuse sphere faces the light
        assert!(image.get(10, 6).length() > 0.0);
    }

    #[test]
    fn test_non_manifold_operand_fails_render() {
        let white = Arc::new(Lambertian::from_color(Color::ONE));
        // Two sheets that both face +z: a ray down -z sees two entries in a row
        let sheets: SurfaceList = [-2.0, -3.0]
            .into_iter()
            .map(|k| Arc::new(AxisRect::xy(-5.0, 5.0, -5.0, 5.0, k, white.clone())) as Arc<dyn Surface>)
            .collect();
        let ball = Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 0.5, white));

        let mut scene = Scene::new()
            .with_image_width(4)
            .with_samples_per_pixel(1)
            .with_threads(2);
        scene.add(Arc::new(Csg::fusion(Arc::new(sheets), ball)));

        match scene.render() {
            Err(RenderError::WorkerPanicked(message)) => {
                assert!(message.contains("non-manifold"), "message = {}", message)
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected the render to fail"),
        }
    }

    #[test]
    fn test_row_rng_streams_differ() {
        use rand::RngCore;
        let a = row_rng(0, 0).next_u64();
        let b = row_rng(0, 1).next_u64();
        let c = row_rng(1, 0).next_u64();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, row_rng(0, 0).next_u64());
    }

    #[test]
    fn test_depth_budget_is_respected() {
        // With no bounces allowed a diffuse sphere renders black
        let image = single_sphere_scene().with_max_depth(0).render().unwrap();
        assert_eq!(image.get(10, 10), Color::ZERO);
        let camera = Camera::new(&CameraConfig::default(), 1.0);
        let ray = camera.get_ray(0.5, 0.5, &mut row_rng(0, 0));
        let world = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::from_color(Color::ONE)),
        );
        assert_eq!(ray_color(&ray, &world, None, 0, None, &mut row_rng(0, 0)), Color::ZERO);
    }
}
