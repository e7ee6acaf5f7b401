//! Umbra renderer - CPU path tracing.
//!
//! A Monte Carlo path tracer over analytic primitives: spheres, axis-aligned
//! rectangles and boxes, constant-density media, and constructive solid
//! geometry built from them. Objects are frozen into a BVH before rendering
//! and shared read-only by every worker thread.

mod bvh;
mod camera;
mod csg;
mod error;
mod hittable;
mod material;
mod medium;
mod pdf;
mod progress;
mod rect;
mod renderer;
mod scene;
mod scheduler;
mod sphere;
mod transform;

pub mod sampling;

pub use bvh::BvhNode;
pub use camera::{Camera, CameraConfig};
pub use csg::{Csg, CsgOp};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Surface, SurfaceList};
pub use material::{
    Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, Scatter, ScatterRecord,
};
pub use medium::ConstantMedium;
pub use pdf::{CosinePdf, MixturePdf, Pdf, SpherePdf, SurfacePdf};
pub use progress::{format_hms, Progress};
pub use rect::{AxisRect, Plane, RectBox};
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render_pixel, sky_gradient, ImageBuffer,
    RenderConfig, RAY_EPSILON,
};
pub use scene::Scene;
pub use scheduler::WorkPool;
pub use sphere::{BumpySphere, Sphere};
pub use transform::{Rotate, Translate};

/// Re-export math and texture types used throughout the public API
pub use umbra_core::{CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture};
pub use umbra_math::{Aabb, Color, Interval, Quat, Ray, Vec3};
