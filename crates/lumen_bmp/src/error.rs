//! Error taxonomy for BMP encoding and decoding.

use thiserror::Error;

/// The file on disk is not a BMP this crate can decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unrecognized file signature {0:#06x}")]
    InvalidSignature(u16),

    #[error("Unsupported bit depth: {0} (expected 24 or 32)")]
    UnsupportedBitDepth(u16),

    #[error("Unsupported compression {compression} for a {bit_count}-bit image")]
    UnsupportedCompression { bit_count: u16, compression: u32 },

    #[error("32-bit image does not contain bit mask information")]
    MissingColorHeader,

    #[error("Unexpected color mask format")]
    UnexpectedColorMask,

    #[error("Unexpected color space type {0:#010x}")]
    UnexpectedColorSpace(u32),

    #[error("Unsupported image height {0}: origin must be bottom-left")]
    NonPositiveHeight(i32),

    #[error("Unsupported image width {0}")]
    NonPositiveWidth(i32),

    #[error("Header declares {expected} bytes of pixel data but only {available} follow")]
    DataSizeMismatch { expected: u64, available: u64 },
}

/// Errors that can occur while building, filling, reading or writing a BMP.
#[derive(Error, Debug)]
pub enum BmpError {
    #[error("File format error: {0}")]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pixel ({x}, {y}) is outside the {width}x{height} image")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Region {w}x{h} at ({x}, {y}) does not fit in the {width}x{height} image")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        width: u32,
        height: u32,
    },

    #[error("Invalid image dimensions {width}x{height}: empty, or too large for 32-bit size fields")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Result type for BMP operations.
pub type BmpResult<T> = Result<T, BmpError>;
