//! Core ray tracing renderer.
//!
//! Implements stochastic ray tracing with:
//! - Recursive ray tracing with a depth budget
//! - A white-to-blue sky gradient as the only light
//! - Anti-aliasing via jittered multi-sampling
//! - Row-parallel rendering straight into a BMP pixel buffer

use std::sync::atomic::{AtomicU32, Ordering};

use crate::{Camera, Color, Hittable, Ray};
use lumen_bmp::{encode_pixel, Bmp};
use lumen_math::{gen_f32, Interval};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Nearest accepted intersection distance, avoids shadow acne.
pub const T_MIN: f32 = 0.001;

/// Rows between progress log lines.
const PROGRESS_INTERVAL: u32 = 16;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Seed for reproducible renders; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            seed: None,
        }
    }
}

/// Compute the color seen by a ray.
///
/// Every call either terminates or recurses with `depth - 1`, so at most
/// `depth` bounces are traced.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) else {
        return sky_gradient(ray);
    };

    match rec.material.scatter(ray, &rec, rng) {
        Some((attenuation, scattered)) => attenuation * ray_color(&scattered, world, depth - 1, rng),
        None => Color::ZERO,
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Sum `samples_per_pixel` jittered samples for pixel `(x, y)`.
///
/// `y = 0` is the bottom row. The result is not averaged; the encoder does
/// that together with gamma correction.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    (x, y): (u32, u32),
    (width, height): (u32, u32),
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let u_span = width.saturating_sub(1).max(1) as f32;
    let v_span = height.saturating_sub(1).max(1) as f32;
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let u = (x as f32 + gen_f32(rng)) / u_span;
        let v = (y as f32 + gen_f32(rng)) / v_span;
        let ray = camera.get_ray(u, v, rng);
        pixel_color += ray_color(&ray, world, config.max_depth, rng);
    }

    pixel_color
}

/// Render the entire scene into `image`.
///
/// Rows are rendered in parallel. Each worker owns one row of the pixel
/// buffer and its own random generator, so no locking is needed.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig, image: &mut Bmp) {
    let width = image.width();
    let height = image.height();
    let row_len = image.row_len();
    let bpp = image.format().bytes_per_pixel();
    let rows_done = AtomicU32::new(0);

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth
    );

    image
        .data_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            let mut rng = row_rng(config.seed, y);

            for (x, pixel) in row.chunks_exact_mut(bpp).enumerate() {
                let color = render_pixel(camera, world, (x as u32, y), (width, height), config, &mut rng);
                encode_pixel(pixel, color, config.samples_per_pixel);
            }

            let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
            if done % PROGRESS_INTERVAL == 0 || done == height {
                log::debug!("Scanlines remaining: {}", height - done);
            }
        });
}

/// Per-row generator: derived from the seed when one is set.
fn row_rng(seed: Option<u64>, y: u32) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ u64::from(y).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => StdRng::from_entropy(),
    }
}
