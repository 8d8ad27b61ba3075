//! Lumen Renderer - CPU ray tracing of sphere scenes.
//!
//! A stochastic recursive ray tracer: jittered camera rays, three scattering
//! materials, a sky-gradient background, and output straight into a
//! [`lumen_bmp::Bmp`] pixel buffer.

mod camera;
mod hittable;
mod material;
mod renderer;
mod sphere;

pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Material};
pub use renderer::{ray_color, render, render_pixel, RenderConfig, T_MIN};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};
