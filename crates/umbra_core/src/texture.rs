//! Textures for materials.
//!
//! A texture maps a surface hit (UV coordinates plus the world-space point)
//! to a color. Image textures are decoded once at scene assembly time; a file
//! that fails to load degrades to a flat fallback color instead of aborting.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use umbra_math::{Color, Vec3};

use crate::perlin::Perlin;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Color returned by an image texture whose file could not be loaded.
pub const FALLBACK_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// Anything that can be sampled for a color at a surface point.
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color;
}

/// A single constant color.
#[derive(Clone, Copy, Debug)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::new(Color::new(red, green, blue))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Vec3) -> Color {
        self.color
    }
}

/// What a checkerboard is keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckerMode {
    /// 3D cells in world space, keyed on the hit point.
    Spatial,
    /// 2D cells in texture space, keyed on `(u, v)`.
    Surface,
}

/// Alternates between two sub-textures.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    frequency: f64,
    mode: CheckerMode,
}

impl CheckerTexture {
    pub fn new(
        even: Arc<dyn Texture>,
        odd: Arc<dyn Texture>,
        frequency: f64,
        mode: CheckerMode,
    ) -> Self {
        Self {
            even,
            odd,
            frequency,
            mode,
        }
    }

    /// Checkerboard of two flat colors.
    pub fn from_colors(even: Color, odd: Color, frequency: f64, mode: CheckerMode) -> Self {
        Self::new(
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
            frequency,
            mode,
        )
    }

    fn parity(&self, x: f64) -> bool {
        ((self.frequency * x).floor().abs() as i64) % 2 == 1
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        let odd = match self.mode {
            CheckerMode::Spatial => self.parity(p.x) ^ self.parity(p.y) ^ self.parity(p.z),
            CheckerMode::Surface => self.parity(u) ^ self.parity(v),
        };

        if odd {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Grey Perlin noise: `0.5 * (1 + noise(scale * p))`.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f64,
}

impl NoiseTexture {
    pub fn new<R: Rng + ?Sized>(scale: f64, rng: &mut R) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f64, _v: f64, p: Vec3) -> Color {
        Color::ONE * 0.5 * (1.0 + self.noise.noise(self.scale * p))
    }
}

/// Grey turbulence: seven octaves of absolute Perlin noise.
pub struct TurbulenceTexture {
    noise: Perlin,
    scale: f64,
}

impl TurbulenceTexture {
    pub fn new<R: Rng + ?Sized>(scale: f64, rng: &mut R) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for TurbulenceTexture {
    fn value(&self, _u: f64, _v: f64, p: Vec3) -> Color {
        Color::ONE * self.noise.turbulence(self.scale * p, 7)
    }
}

/// A decoded RGB image sampled with nearest-pixel lookup.
///
/// UV coordinates are in [0, 1] range, with (0, 0) at bottom-left.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major RGB, top row first, channels scaled to 0-1
    pixels: Vec<[f64; 3]>,
    /// Original file path (for debugging)
    path: String,
}

impl ImageTexture {
    /// Load an image from disk.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let color_scale = 1.0 / 255.0;
        let pixels = rgb
            .pixels()
            .map(|p| {
                [
                    p[0] as f64 * color_scale,
                    p[1] as f64 * color_scale,
                    p[2] as f64 * color_scale,
                ]
            })
            .collect();

        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);

        Ok(Self {
            width,
            height,
            pixels,
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Load an image, or return a texture that yields [`FALLBACK_COLOR`].
    pub fn open_or_fallback(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("{}; using fallback color", err);
                Self::empty(path)
            }
        }
    }

    fn empty(path: &Path) -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            path: path.to_string_lossy().to_string(),
        }
    }

    /// Build a texture directly from pixel data (row-major, top row first).
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f64; 3]>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
            path: "<memory>".to_string(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        !self.pixels.is_empty()
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Vec3) -> Color {
        if !self.is_loaded() {
            return FALLBACK_COLOR;
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0); // Flip V for image coordinates

        let i = ((u * self.width as f64) as u32).min(self.width - 1);
        let j = ((v * self.height as f64) as u32).min(self.height - 1);

        let [r, g, b] = self.pixels[(j * self.width + i) as usize];
        Color::new(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_color_texture() {
        let tex = SolidColor::rgb(1.0, 0.5, 0.0);
        assert_eq!(tex.value(0.3, 0.7, Vec3::ONE), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_spatial_checker_alternates() {
        let white = Color::ONE;
        let black = Color::ZERO;
        let checker = CheckerTexture::from_colors(white, black, 1.0, CheckerMode::Spatial);

        assert_eq!(checker.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5)), white);
        assert_eq!(checker.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5)), black);
        assert_eq!(checker.value(0.0, 0.0, Vec3::new(1.5, 1.5, 0.5)), white);
    }

    #[test]
    fn test_surface_checker_uses_uv() {
        let checker =
            CheckerTexture::from_colors(Color::ONE, Color::ZERO, 10.0, CheckerMode::Surface);

        assert_eq!(checker.value(0.05, 0.05, Vec3::ZERO), Color::ONE);
        assert_eq!(checker.value(0.15, 0.05, Vec3::ZERO), Color::ZERO);
    }

    #[test]
    fn test_noise_texture_range() {
        let tex = NoiseTexture::new(4.0, &mut StdRng::seed_from_u64(5));
        for i in 0..50 {
            let c = tex.value(0.0, 0.0, Vec3::splat(i as f64 * 0.13));
            assert_eq!(c.x, c.y);
            assert!(c.x > -0.5 && c.x < 1.5);
        }
    }

    #[test]
    fn test_turbulence_texture_is_grey_and_non_negative() {
        let tex = TurbulenceTexture::new(4.0, &mut StdRng::seed_from_u64(5));
        for i in 0..50 {
            let c = tex.value(0.0, 0.0, Vec3::new(i as f64 * 0.31, 1.7, -0.2));
            assert_eq!(c.x, c.z);
            assert!(c.x >= 0.0);
        }
    }

    #[test]
    fn test_image_texture_lookup() {
        // 2x2 image: top row red, green; bottom row blue, white
        let tex = ImageTexture::from_pixels(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
            ],
        );

        assert_eq!(tex.value(0.0, 1.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(1.0, 1.0, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.0, 0.0, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
        // Out-of-range UVs clamp to the edge
        assert_eq!(tex.value(2.0, -1.0, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_missing_image_falls_back() {
        let tex = ImageTexture::open_or_fallback("definitely/not/here.png");

        assert!(!tex.is_loaded());
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), FALLBACK_COLOR);
    }

    #[test]
    fn test_open_missing_image_errors() {
        assert!(ImageTexture::open("definitely/not/here.png").is_err());
    }
}
