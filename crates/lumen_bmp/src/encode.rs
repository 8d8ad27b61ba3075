//! Conversion of summed radiance samples into stored bytes.

use lumen_math::{Interval, Vec3};

/// Linear RGB color.
pub type Color = Vec3;

/// Gamma-corrected channels are clamped here so `256 * c` never reaches 256.
const INTENSITY: Interval = Interval { min: 0.0, max: 0.999 };

/// Average a channel over `samples` and apply gamma 2.0.
#[inline]
pub fn gamma_correct(channel: f32, samples: u32) -> f32 {
    let scale = 1.0 / samples.max(1) as f32;
    (scale * channel).max(0.0).sqrt()
}

/// Quantize a gamma-corrected channel to a byte.
#[inline]
pub fn quantize(channel: f32) -> u8 {
    (256.0 * INTENSITY.clamp(channel)) as u8
}

/// Encode a summed color into one stored pixel (B, G, R and, for a
/// four-byte pixel, an opaque alpha).
pub fn encode_pixel(pixel: &mut [u8], color: Color, samples: u32) {
    pixel[0] = quantize(gamma_correct(color.z, samples));
    pixel[1] = quantize(gamma_correct(color.y, samples));
    pixel[2] = quantize(gamma_correct(color.x, samples));
    if pixel.len() == 4 {
        pixel[3] = 255;
    }
}
