//! Umbra Core - textures for surface and volume materials.
//!
//! This crate provides:
//!
//! - **Texture trait**: `value(u, v, p)` lookups shared by every material
//! - **Procedural textures**: solid colors, checkerboards, Perlin noise
//! - **Image textures**: files decoded with the `image` crate, with a
//!   fallback color when loading fails
//!
//! # Example
//!
//! ```ignore
//! use umbra_core::{ImageTexture, Texture};
//!
//! let earth = ImageTexture::open_or_fallback("earthmap.jpg");
//! let color = earth.value(0.5, 0.5, Vec3::ZERO);
//! ```

pub mod perlin;
pub mod texture;

// Re-export commonly used types
pub use perlin::Perlin;
pub use texture::{
    CheckerMode, CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, TextureError,
    TextureResult, TurbulenceTexture, FALLBACK_COLOR,
};
