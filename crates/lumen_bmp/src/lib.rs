//! Lumen BMP - bitmap image encoding for rendered output.
//!
//! This crate provides:
//!
//! - **`Bmp`**: an in-memory 24-bit (BGR) or 32-bit (BGRA) pixel buffer
//!   stored bottom row first
//! - **Pixel encoding**: gamma-2 correction and quantization of summed
//!   radiance samples
//! - **Serialization**: file, info and color-mask headers with 4-byte row
//!   padding, and the matching validating reader
//!
//! # Example
//!
//! ```ignore
//! use lumen_bmp::Bmp;
//! use lumen_math::Vec3;
//!
//! let mut image = Bmp::new(2, 2, false)?;
//! image.write_color(0, 0, Vec3::new(1.0, 0.0, 0.0), 1)?;
//! image.write("red.bmp")?;
//! ```

mod bmp;
mod encode;
mod error;
mod header;

pub use bmp::Bmp;
pub use encode::{encode_pixel, gamma_correct, quantize, Color};
pub use error::{BmpError, BmpResult, FormatError};
pub use header::{
    ColorHeader, FileHeader, InfoHeader, PixelFormat, COLOR_HEADER_SIZE, FILE_HEADER_SIZE,
    INFO_HEADER_SIZE, SIGNATURE,
};
