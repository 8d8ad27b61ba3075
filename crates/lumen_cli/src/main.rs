//! Lumen - render the demo scene to a bitmap.
//!
//! Settings come from the JSON file named by `LUMEN_CONFIG`, or defaults.
//! Log verbosity follows `RUST_LOG`.

use std::time::Instant;

use anyhow::{Context, Result};
use lumen_bmp::Bmp;
use lumen_renderer::render;

mod config;
mod scene;

use config::AppConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Lumen");

    let config = AppConfig::from_env()?;
    let width = config.image_width;
    let height = config.image_height();

    let start = Instant::now();
    let world = scene::demo_scene();
    let camera = scene::demo_camera(config.aspect_ratio);
    log::info!("Scene built with {} objects in {:?}", world.len(), start.elapsed());

    let mut image = Bmp::new(width, height, config.has_alpha)
        .with_context(|| format!("Cannot allocate a {}x{} image", width, height))?;

    let start = Instant::now();
    render(&camera, &world, &config.render, &mut image);
    log::info!("Rendered in {:?}", start.elapsed());

    image
        .write(&config.output)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    log::info!("Saved to {}", config.output.display());

    Ok(())
}
