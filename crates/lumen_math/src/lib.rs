//! Lumen math types.
//!
//! Vector algebra comes straight from `glam`; this crate adds the ray and
//! interval types plus the random sampling helpers the renderer consumes.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod random;
mod ray;

pub use interval::Interval;
pub use random::{gen_f32, near_zero, random_in_unit_disk, random_unit_vector, reflect, refract};
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vec3_component_product() {
        let a = Vec3::new(0.5, 1.0, 0.25);
        let b = Vec3::new(2.0, 3.0, 4.0);
        assert_eq!(a * b, Vec3::new(1.0, 3.0, 1.0));
    }
}
