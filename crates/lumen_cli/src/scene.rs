//! The demo scene rendered by the binary.

use std::sync::Arc;

use lumen_math::Vec3;
use lumen_renderer::{Camera, Color, HittableList, Material, Sphere};

/// Ground plus one sphere of each material.
pub fn demo_scene() -> HittableList {
    let mut world = HittableList::new();

    // Ground
    let ground = Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
    world.add(Box::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)));

    let glass = Arc::new(Material::dielectric(0.7));
    world.add(Box::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)));

    let diffuse = Arc::new(Material::lambertian(Color::new(0.4, 0.2, 0.6)));
    world.add(Box::new(Sphere::new(Vec3::new(-5.5, 1.0, 0.0), 1.0, diffuse)));

    let metal = Arc::new(Material::metal(Color::new(0.7, 0.2, 0.5), 0.0));
    world.add(Box::new(Sphere::new(Vec3::new(5.5, 1.0, 0.0), 1.0, metal)));

    world
}

/// Camera looking at the demo scene from slightly above.
pub fn demo_camera(aspect_ratio: f32) -> Camera {
    let mut camera = Camera::new()
        .with_aspect_ratio(aspect_ratio)
        .with_position(
            Vec3::new(13.0, 2.0, 3.0), // look_from
            Vec3::new(0.0, 0.0, 0.0),  // look_at
            Vec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_lens(20.0, 0.1, 10.0);
    camera.initialize();
    camera
}
