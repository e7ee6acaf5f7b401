//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a bounce budget
//! - Light importance sampling through mixture PDFs
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rand::RngCore;
use umbra_math::{Color, Interval, Ray};

use crate::camera::Camera;
use crate::error::RenderResult;
use crate::hittable::Surface;
use crate::material::Scatter;
use crate::pdf::{MixturePdf, Pdf, SurfacePdf};
use crate::sampling::gen_f64;

/// Closest hit distance accepted, to avoid self-intersection ("shadow acne").
pub const RAY_EPSILON: f64 = 0.001;

/// Per-render settings shared by every pixel.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of scattering bounces
    pub max_depth: u32,
    /// Color for rays that escape; `None` uses the sky gradient
    pub background: Option<Color>,
}

/// Compute the color seen by a ray.
///
/// `depth` is the number of scattering bounces still allowed. `lights`, when
/// present, receives half of the sampled directions at every diffuse bounce.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Surface,
    lights: Option<&dyn Surface>,
    depth: u32,
    background: Option<Color>,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = world.hit(ray, Interval::new(RAY_EPSILON, f64::INFINITY)) else {
        return background.unwrap_or_else(|| sky_gradient(ray));
    };

    // Get emission from material (for lights)
    let emitted = rec.material.emitted(ray, &rec);
    if depth == 0 {
        return emitted;
    }

    let Some(srec) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    match srec.scatter {
        Scatter::Specular(scattered) => {
            emitted
                + srec.attenuation
                    * ray_color(&scattered, world, lights, depth - 1, background, rng)
        }
        Scatter::Pdf(material_pdf) => {
            let (direction, pdf_value) = match lights {
                Some(lights) => {
                    let light_pdf = SurfacePdf::new(lights, rec.p);
                    let mixture = MixturePdf::even(&light_pdf, material_pdf.as_ref());
                    let direction = mixture.generate(rng);
                    (direction, mixture.value(direction))
                }
                None => {
                    let direction = material_pdf.generate(rng);
                    (direction, material_pdf.value(direction))
                }
            };

            // Also rejects NaN
            if !(pdf_value > 0.0) {
                return emitted;
            }

            let scattered = Ray::new(rec.p, direction);
            let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
            let incoming = ray_color(&scattered, world, lights, depth - 1, background, rng);

            emitted + srec.attenuation * scattering_pdf * incoming / pdf_value
        }
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let channel = |c: f64| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// `y` counts rows from the top of the image.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Surface,
    lights: Option<&dyn Surface>,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let s_scale = (config.image_width.max(2) - 1) as f64;
    let t_scale = (config.image_height.max(2) - 1) as f64;
    let flipped_row = (config.image_height - 1 - y) as f64;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f64 + gen_f64(rng)) / s_scale;
        let t = (flipped_row + gen_f64(rng)) / t_scale;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, world, lights, config.max_depth, config.background, rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f64
}

/// Image buffer storing averaged linear colors, top row first.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Write the image as plain-text PPM (P3).
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;
        for color in &self.pixels {
            let [r, g, b] = color_to_rgb(*color);
            writeln!(out, "{} {} {}", r, g, b)?;
        }
        out.flush()
    }

    /// Save to disk. `.ppm` paths are written as P3 text, anything else is
    /// encoded by the `image` crate from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            self.write_ppm(BufWriter::new(File::create(path)?))?;
        } else {
            let img = image::RgbImage::from_fn(self.width, self.height, |x, y| {
                image::Rgb(color_to_rgb(self.get(x, y)))
            });
            img.save(path)?;
        }

        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
