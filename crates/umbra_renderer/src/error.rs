//! Fatal render errors.
//!
//! Scene-authoring defects (empty BVH input, unbounded children, non-manifold
//! CSG operands) and pool failures all abort the render before any image
//! bytes are written.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot build a BVH from an empty object list")]
    EmptyScene,

    #[error("object {index} has no bounding box and cannot be placed in a BVH")]
    MissingBoundingBox { index: usize },

    #[error(
        "non-manifold CSG operand: two consecutive {} crossings at t = {t}",
        crossing_kind(.front_face)
    )]
    NonManifold { t: f64, front_face: bool },

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("render worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

fn crossing_kind(front_face: &bool) -> &'static str {
    if *front_face {
        "entering"
    } else {
        "exiting"
    }
}
