//! Fixed-size BMP headers, serialized little-endian field by field.

use std::io::{self, Read, Write};

use crate::error::FormatError;

/// "BM" read as a little-endian u16.
pub const SIGNATURE: u16 = 0x4D42;

/// Size of [`FileHeader`] on disk.
pub const FILE_HEADER_SIZE: u32 = 14;
/// Size of [`InfoHeader`] on disk.
pub const INFO_HEADER_SIZE: u32 = 40;
/// Size of [`ColorHeader`] on disk.
pub const COLOR_HEADER_SIZE: u32 = 84;

/// Rows are aligned to this many bytes on disk.
pub const ROW_ALIGNMENT: usize = 4;

const SRGB_COLOR_SPACE: u32 = 0x7352_4742;
const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;

/// Pixel layouts the encoder supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Blue, green, red. Rows are padded to 4 bytes.
    Bgr24,
    /// Blue, green, red, alpha with an sRGB color-mask header.
    Bgra32,
}

impl PixelFormat {
    pub fn from_bit_count(bit_count: u16) -> Result<Self, FormatError> {
        match bit_count {
            24 => Ok(PixelFormat::Bgr24),
            32 => Ok(PixelFormat::Bgra32),
            other => Err(FormatError::UnsupportedBitDepth(other)),
        }
    }

    pub fn bit_count(self) -> u16 {
        match self {
            PixelFormat::Bgr24 => 24,
            PixelFormat::Bgra32 => 32,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.bit_count() as usize / 8
    }

    /// Compression tag written into the info header.
    pub fn compression(self) -> u32 {
        match self {
            PixelFormat::Bgr24 => BI_RGB,
            PixelFormat::Bgra32 => BI_BITFIELDS,
        }
    }

    pub fn has_color_header(self) -> bool {
        matches!(self, PixelFormat::Bgra32)
    }

    /// Byte offset where pixel data begins.
    pub fn data_offset(self) -> u32 {
        FILE_HEADER_SIZE + self.info_size()
    }

    /// Bytes one row of `width` pixels occupies on disk, padded to a
    /// multiple of [`ROW_ALIGNMENT`].
    pub fn row_stride(self, width: u32) -> u64 {
        let align = ROW_ALIGNMENT as u64;
        let row_len = u64::from(width) * self.bytes_per_pixel() as u64;
        (row_len + align - 1) & !(align - 1)
    }

    /// Serialized size of a `width` x `height` file, or `None` when it does
    /// not fit the 32-bit size fields of the headers.
    pub fn file_size(self, width: u32, height: u32) -> Option<u32> {
        let image_size = self.row_stride(width).checked_mul(u64::from(height))?;
        let total = image_size.checked_add(u64::from(self.data_offset()))?;
        u32::try_from(total).ok()
    }

    /// Value of `InfoHeader::size`, which includes the color header when present.
    pub fn info_size(self) -> u32 {
        if self.has_color_header() {
            INFO_HEADER_SIZE + COLOR_HEADER_SIZE
        } else {
            INFO_HEADER_SIZE
        }
    }
}

/// The leading `BITMAPFILEHEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub file_type: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub offset_data: u32,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            file_type: SIGNATURE,
            file_size: 0,
            reserved1: 0,
            reserved2: 0,
            offset_data: 0,
        }
    }
}

impl FileHeader {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.file_type.to_le_bytes())?;
        w.write_all(&self.file_size.to_le_bytes())?;
        w.write_all(&self.reserved1.to_le_bytes())?;
        w.write_all(&self.reserved2.to_le_bytes())?;
        w.write_all(&self.offset_data.to_le_bytes())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            file_type: read_u16(r)?,
            file_size: read_u32(r)?,
            reserved1: read_u16(r)?,
            reserved2: read_u16(r)?,
            offset_data: read_u32(r)?,
        })
    }
}

/// The `BITMAPINFOHEADER` describing dimensions and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub size: u32,
    pub width: i32,
    /// Positive means bottom-up rows.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl Default for InfoHeader {
    fn default() -> Self {
        Self {
            size: 0,
            width: 0,
            height: 0,
            planes: 1,
            bit_count: 0,
            compression: 0,
            size_image: 0,
            x_pixels_per_meter: 0,
            y_pixels_per_meter: 0,
            colors_used: 0,
            colors_important: 0,
        }
    }
}

impl InfoHeader {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.size.to_le_bytes())?;
        w.write_all(&self.width.to_le_bytes())?;
        w.write_all(&self.height.to_le_bytes())?;
        w.write_all(&self.planes.to_le_bytes())?;
        w.write_all(&self.bit_count.to_le_bytes())?;
        w.write_all(&self.compression.to_le_bytes())?;
        w.write_all(&self.size_image.to_le_bytes())?;
        w.write_all(&self.x_pixels_per_meter.to_le_bytes())?;
        w.write_all(&self.y_pixels_per_meter.to_le_bytes())?;
        w.write_all(&self.colors_used.to_le_bytes())?;
        w.write_all(&self.colors_important.to_le_bytes())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            size: read_u32(r)?,
            width: read_i32(r)?,
            height: read_i32(r)?,
            planes: read_u16(r)?,
            bit_count: read_u16(r)?,
            compression: read_u32(r)?,
            size_image: read_u32(r)?,
            x_pixels_per_meter: read_i32(r)?,
            y_pixels_per_meter: read_i32(r)?,
            colors_used: read_u32(r)?,
            colors_important: read_u32(r)?,
        })
    }
}

/// Channel bit masks and color space for 32-bit images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorHeader {
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    pub alpha_mask: u32,
    pub color_space_type: u32,
    pub unused: [u32; 16],
}

impl Default for ColorHeader {
    /// The only layout written and accepted: BGRA bytes in sRGB.
    fn default() -> Self {
        Self {
            red_mask: 0x00ff_0000,
            green_mask: 0x0000_ff00,
            blue_mask: 0x0000_00ff,
            alpha_mask: 0xff00_0000,
            color_space_type: SRGB_COLOR_SPACE,
            unused: [0; 16],
        }
    }
}

impl ColorHeader {
    /// Reject any mask or color space other than the default.
    pub fn check(&self) -> Result<(), FormatError> {
        let expected = ColorHeader::default();
        if self.red_mask != expected.red_mask
            || self.green_mask != expected.green_mask
            || self.blue_mask != expected.blue_mask
            || self.alpha_mask != expected.alpha_mask
        {
            return Err(FormatError::UnexpectedColorMask);
        }
        if self.color_space_type != expected.color_space_type {
            return Err(FormatError::UnexpectedColorSpace(self.color_space_type));
        }
        Ok(())
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.red_mask.to_le_bytes())?;
        w.write_all(&self.green_mask.to_le_bytes())?;
        w.write_all(&self.blue_mask.to_le_bytes())?;
        w.write_all(&self.alpha_mask.to_le_bytes())?;
        w.write_all(&self.color_space_type.to_le_bytes())?;
        for word in &self.unused {
            w.write_all(&word.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let red_mask = read_u32(r)?;
        let green_mask = read_u32(r)?;
        let blue_mask = read_u32(r)?;
        let alpha_mask = read_u32(r)?;
        let color_space_type = read_u32(r)?;
        let mut unused = [0u32; 16];
        for word in unused.iter_mut() {
            *word = read_u32(r)?;
        }
        Ok(Self {
            red_mask,
            green_mask,
            blue_mask,
            alpha_mask,
            color_space_type,
            unused,
        })
    }
}

fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(r: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}
