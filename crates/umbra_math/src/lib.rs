//! Umbra math - geometry substrate for the path tracer.
//!
//! Everything is double precision: CSG re-queries advance along a ray by a
//! small epsilon and need headroom above floating-point noise at scene scale.

// Re-export glam's f64 types under the names the renderer uses
pub use glam::{DMat4 as Mat4, DQuat as Quat, DVec3 as Vec3};

mod aabb;
mod interval;
mod onb;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use transform::Mat4Ext;

/// RGB color, linear, nominally 0-1 per channel.
pub type Color = Vec3;
