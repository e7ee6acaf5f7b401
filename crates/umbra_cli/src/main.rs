//! `umbra` - render one of the built-in scenes to an image file.

mod scenes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use scenes::SceneName;

#[derive(Parser, Debug)]
#[command(name = "umbra", version, about = "Offline CPU path tracer")]
struct Args {
    /// Scene to render
    #[arg(value_enum, default_value_t = SceneName::CornellBox)]
    scene: SceneName,

    /// Image width in pixels; height follows the scene's aspect ratio
    #[arg(short, long)]
    width: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    samples: Option<u32>,

    /// Maximum number of scattering bounces
    #[arg(short, long)]
    depth: Option<u32>,

    /// Worker threads (defaults to the number of logical CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Seed for scene generation and sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output path; `.ppm` is written as text, other extensions are encoded
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,
}

fn run(args: Args) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut scene = args.scene.build(&mut rng).with_seed(args.seed);

    if let Some(width) = args.width {
        scene = scene.with_image_width(width);
    }
    if let Some(samples) = args.samples {
        scene = scene.with_samples_per_pixel(samples);
    }
    if let Some(depth) = args.depth {
        scene = scene.with_max_depth(depth);
    }
    let threads = args
        .threads
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, |n| n.get()));
    scene = scene.with_threads(threads);

    log::info!("Scene {:?}: {} objects", args.scene, scene.objects().len());

    let image = scene
        .render()
        .with_context(|| format!("failed to render scene {:?}", args.scene))?;
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("Wrote {}", args.output.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Args::parse()) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
