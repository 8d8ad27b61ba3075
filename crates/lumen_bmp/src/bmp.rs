//! In-memory bitmap and its file serialization.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::encode::{encode_pixel, quantize, Color};
use crate::error::{BmpError, BmpResult, FormatError};
use crate::header::{
    ColorHeader, FileHeader, InfoHeader, PixelFormat, COLOR_HEADER_SIZE, INFO_HEADER_SIZE, ROW_ALIGNMENT,
    SIGNATURE,
};

/// A 24-bit or 32-bit bitmap.
///
/// Pixel data is row-major with row 0 at the bottom of the image, and holds
/// `width * height * bytes_per_pixel` bytes with no padding. Padding only
/// exists in the serialized form, whose size always fits the u32 header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bmp {
    width: u32,
    height: u32,
    format: PixelFormat,
    file_size: u32,
    data: Vec<u8>,
}

impl Bmp {
    /// Create a black image. `has_alpha` selects 32-bit BGRA over 24-bit BGR.
    pub fn new(width: u32, height: u32, has_alpha: bool) -> BmpResult<Self> {
        let format = if has_alpha {
            PixelFormat::Bgra32
        } else {
            PixelFormat::Bgr24
        };
        Self::with_format(width, height, format)
    }

    /// Create a black image with an explicit pixel format.
    pub fn with_format(width: u32, height: u32, format: PixelFormat) -> BmpResult<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(BmpError::InvalidDimensions { width, height });
        }
        let file_size = format
            .file_size(width, height)
            .ok_or(BmpError::InvalidDimensions { width, height })?;
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Ok(Self {
            width,
            height,
            format,
            file_size,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Unpadded pixel bytes, bottom row first.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel bytes. Split with `row_len()` to hand out disjoint rows.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes of pixel data in one row, without padding.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Bytes one row occupies on disk: `row_len` rounded up to a multiple of 4.
    pub fn row_stride(&self) -> usize {
        self.format.row_stride(self.width) as usize
    }

    /// Total size of the serialized file in bytes.
    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    fn image_size(&self) -> u32 {
        self.file_size - self.format.data_offset()
    }

    /// The stored channel bytes (B, G, R[, A]) of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        Some(&self.data[offset..offset + self.format.bytes_per_pixel()])
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        self.format.bytes_per_pixel() * (y as usize * self.width as usize + x as usize)
    }

    /// Average, gamma-correct and store a summed color at `(x, y)`.
    pub fn write_color(&mut self, x: u32, y: u32, color: Color, samples_per_pixel: u32) -> BmpResult<()> {
        if x >= self.width || y >= self.height {
            return Err(BmpError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let offset = self.offset(x, y);
        let bpp = self.format.bytes_per_pixel();
        encode_pixel(&mut self.data[offset..offset + bpp], color, samples_per_pixel);
        Ok(())
    }

    /// Fill a `w` x `h` rectangle with a flat color.
    ///
    /// The color is quantized as is, without averaging or gamma correction.
    /// `alpha` is ignored for 24-bit images.
    pub fn fill_region(&mut self, x0: u32, y0: u32, w: u32, h: u32, color: Color, alpha: u8) -> BmpResult<()> {
        let fits_x = x0.checked_add(w).is_some_and(|x1| x1 <= self.width);
        let fits_y = y0.checked_add(h).is_some_and(|y1| y1 <= self.height);
        if !fits_x || !fits_y {
            return Err(BmpError::RegionOutOfBounds {
                x: x0,
                y: y0,
                w,
                h,
                width: self.width,
                height: self.height,
            });
        }

        let bpp = self.format.bytes_per_pixel();
        let value = [quantize(color.z), quantize(color.y), quantize(color.x), alpha];
        let value = &value[..bpp];
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let offset = self.offset(x, y);
                self.data[offset..offset + bpp].copy_from_slice(value);
            }
        }
        Ok(())
    }

    fn headers(&self) -> (FileHeader, InfoHeader) {
        let file_header = FileHeader {
            file_size: self.file_size(),
            offset_data: self.format.data_offset(),
            ..FileHeader::default()
        };
        let info_header = InfoHeader {
            size: self.format.info_size(),
            width: self.width as i32,
            height: self.height as i32,
            bit_count: self.format.bit_count(),
            compression: self.format.compression(),
            size_image: self.image_size(),
            ..InfoHeader::default()
        };
        (file_header, info_header)
    }

    /// Serialize headers and rows, padding each row to a multiple of 4 bytes.
    pub fn write_to<W: Write>(&self, w: &mut W) -> BmpResult<()> {
        let (file_header, info_header) = self.headers();
        file_header.write_to(w)?;
        info_header.write_to(w)?;
        if self.format.has_color_header() {
            ColorHeader::default().write_to(w)?;
        }

        let row_len = self.row_len();
        let padding = [0u8; ROW_ALIGNMENT];
        let padding = &padding[..self.row_stride() - row_len];
        for row in self.data.chunks_exact(row_len) {
            w.write_all(row)?;
            w.write_all(padding)?;
        }
        Ok(())
    }

    /// Serialize into a new byte vector.
    pub fn to_bytes(&self) -> BmpResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.file_size() as usize);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Write the image to a file, creating or truncating it.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> BmpResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::debug!(
            "Wrote {}x{} {}-bit BMP ({} bytes) to {}",
            self.width,
            self.height,
            self.format.bit_count(),
            self.file_size(),
            path.display()
        );
        Ok(())
    }

    /// Read an image from a file.
    pub fn read<P: AsRef<Path>>(path: P) -> BmpResult<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let image = Self::read_from(&mut reader)?;
        log::debug!(
            "Read {}x{} {}-bit BMP from {}",
            image.width,
            image.height,
            image.format.bit_count(),
            path.display()
        );
        Ok(image)
    }

    /// Decode an image, validating every header field this encoder relies on.
    pub fn read_from<R: Read + Seek>(r: &mut R) -> BmpResult<Self> {
        let file_header = FileHeader::read_from(r)?;
        if file_header.file_type != SIGNATURE {
            return Err(FormatError::InvalidSignature(file_header.file_type).into());
        }

        let info_header = InfoHeader::read_from(r)?;
        let format = PixelFormat::from_bit_count(info_header.bit_count)?;

        if format.has_color_header() {
            if info_header.size < INFO_HEADER_SIZE + COLOR_HEADER_SIZE {
                log::warn!("32-bit BMP has a {}-byte info header and no bit masks", info_header.size);
                return Err(FormatError::MissingColorHeader.into());
            }
            ColorHeader::read_from(r)?.check()?;
        } else if info_header.compression != format.compression() {
            return Err(FormatError::UnsupportedCompression {
                bit_count: info_header.bit_count,
                compression: info_header.compression,
            }
            .into());
        }

        if info_header.height <= 0 {
            return Err(FormatError::NonPositiveHeight(info_header.height).into());
        }
        if info_header.width <= 0 {
            return Err(FormatError::NonPositiveWidth(info_header.width).into());
        }

        let width = info_header.width as u32;
        let height = info_header.height as u32;

        // Check the declared pixel data against the stream before allocating for it
        let expected = format.row_stride(width).saturating_mul(u64::from(height));
        let available = r
            .seek(SeekFrom::End(0))?
            .saturating_sub(u64::from(file_header.offset_data));
        if expected > available {
            return Err(FormatError::DataSizeMismatch { expected, available }.into());
        }

        let mut image = Self::with_format(width, height, format)?;

        r.seek(SeekFrom::Start(file_header.offset_data as u64))?;
        let row_len = image.row_len();
        let mut padding = [0u8; ROW_ALIGNMENT];
        let padding = &mut padding[..image.row_stride() - row_len];
        for row in image.data.chunks_exact_mut(row_len) {
            r.read_exact(row)?;
            r.read_exact(padding)?;
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn patterned(width: u32, height: u32, has_alpha: bool) -> Bmp {
        let mut image = Bmp::new(width, height, has_alpha).unwrap();
        for (i, byte) in image.data_mut().iter_mut().enumerate() {
            *byte = (i * 7 % 251) as u8;
        }
        image
    }

    fn round_trip(image: &Bmp) -> Bmp {
        let bytes = image.to_bytes().unwrap();
        assert_eq!(bytes.len(), image.file_size() as usize);
        Bmp::read_from(&mut Cursor::new(bytes)).unwrap()
    }

    fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn test_round_trip_24_bit_unpadded() {
        let image = patterned(4, 3, false);
        assert_eq!(image.row_len(), image.row_stride());

        let decoded = round_trip(&image);
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_round_trip_24_bit_padded() {
        let image = patterned(3, 2, false);
        assert_eq!(image.row_len(), 9);
        assert_eq!(image.row_stride(), 12);
        assert_eq!(image.file_size(), 54 + 12 * 2);

        let decoded = round_trip(&image);
        assert_eq!(decoded.data(), image.data());
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
    }

    #[test]
    fn test_round_trip_32_bit() {
        let image = patterned(3, 5, true);
        assert_eq!(image.row_len(), image.row_stride());
        assert_eq!(image.file_size(), 138 + 12 * 5);

        let decoded = round_trip(&image);
        assert_eq!(decoded, image);
        assert_eq!(decoded.format(), PixelFormat::Bgra32);
    }

    #[test]
    fn test_padding_written_per_row() {
        let mut image = Bmp::new(1, 2, false).unwrap();
        image.fill_region(0, 0, 1, 2, Color::ONE, 0).unwrap();
        let bytes = image.to_bytes().unwrap();

        // Each 3-byte row is followed by one zero byte
        assert_eq!(&bytes[54..], &[255, 255, 255, 0, 255, 255, 255, 0]);
    }

    #[test]
    fn test_headers_on_disk() {
        let image = Bmp::new(5, 2, true).unwrap();
        let bytes = image.to_bytes().unwrap();

        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(u32::from_le_bytes(bytes[2..6].try_into().unwrap()), image.file_size());
        assert_eq!(u32::from_le_bytes(bytes[10..14].try_into().unwrap()), 138);
        assert_eq!(u32::from_le_bytes(bytes[14..18].try_into().unwrap()), 124);
        assert_eq!(i32::from_le_bytes(bytes[18..22].try_into().unwrap()), 5);
        assert_eq!(i32::from_le_bytes(bytes[22..26].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(bytes[28..30].try_into().unwrap()), 32);
        assert_eq!(u32::from_le_bytes(bytes[30..34].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(bytes[70..74].try_into().unwrap()), 0x7352_4742);
    }

    #[test]
    fn test_red_image_24_bit() {
        let mut image = Bmp::new(2, 2, false).unwrap();
        for y in 0..2 {
            for x in 0..2 {
                image.write_color(x, y, Color::new(1.0, 0.0, 0.0), 1).unwrap();
            }
        }

        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(image.pixel(x, y).unwrap(), &[0, 0, 255]);
            }
        }
    }

    #[test]
    fn test_write_color_averages_samples() {
        let mut image = Bmp::new(1, 1, true).unwrap();
        // 4 samples summing to (1, 4, 0) average to (0.25, 1, 0)
        image.write_color(0, 0, Color::new(1.0, 4.0, 0.0), 4).unwrap();
        assert_eq!(image.pixel(0, 0).unwrap(), &[0, 255, 128, 255]);
    }

    #[test]
    fn test_write_color_out_of_bounds() {
        let mut image = Bmp::new(4, 3, false).unwrap();

        assert!(matches!(
            image.write_color(4, 0, Color::ONE, 1),
            Err(BmpError::PixelOutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(matches!(
            image.write_color(0, 3, Color::ONE, 1),
            Err(BmpError::PixelOutOfBounds { .. })
        ));
        assert!(image.write_color(3, 2, Color::ONE, 1).is_ok());
    }

    #[test]
    fn test_fill_region() {
        let mut image = Bmp::new(4, 4, true).unwrap();
        image.fill_region(1, 1, 2, 2, Color::new(0.0, 0.0, 1.0), 128).unwrap();

        assert_eq!(image.pixel(1, 1).unwrap(), &[255, 0, 0, 128]);
        assert_eq!(image.pixel(2, 2).unwrap(), &[255, 0, 0, 128]);
        assert_eq!(image.pixel(0, 0).unwrap(), &[0, 0, 0, 0]);
        assert_eq!(image.pixel(3, 3).unwrap(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_fill_region_out_of_bounds() {
        let mut image = Bmp::new(4, 4, false).unwrap();

        assert!(matches!(
            image.fill_region(2, 0, 3, 1, Color::ONE, 255),
            Err(BmpError::RegionOutOfBounds { .. })
        ));
        assert!(matches!(
            image.fill_region(0, u32::MAX, 1, 2, Color::ONE, 255),
            Err(BmpError::RegionOutOfBounds { .. })
        ));
        assert!(image.fill_region(0, 0, 4, 4, Color::ONE, 255).is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Bmp::new(0, 4, false),
            Err(BmpError::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            Bmp::new(4, u32::MAX, true),
            Err(BmpError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_rejects_images_too_large_for_header_fields() {
        assert!(matches!(
            Bmp::new(40_000, 40_000, false),
            Err(BmpError::InvalidDimensions { width: 40_000, height: 40_000 })
        ));
        assert!(matches!(
            Bmp::with_format(1_073_741_790, 1, PixelFormat::Bgra32),
            Err(BmpError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_pixel_accessor_bounds() {
        let image = Bmp::new(2, 2, false).unwrap();
        assert!(image.pixel(1, 1).is_some());
        assert!(image.pixel(2, 0).is_none());
    }

    #[test]
    fn test_read_rejects_bad_signature() {
        let mut bytes = Bmp::new(2, 2, false).unwrap().to_bytes().unwrap();
        bytes[0] = b'P';
        bytes[1] = b'6';

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, BmpError::Format(FormatError::InvalidSignature(0x3650))));
    }

    #[test]
    fn test_read_rejects_negative_height() {
        let mut bytes = Bmp::new(2, 2, false).unwrap().to_bytes().unwrap();
        bytes[22..26].copy_from_slice(&(-2i32).to_le_bytes());

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, BmpError::Format(FormatError::NonPositiveHeight(-2))));
    }

    #[test]
    fn test_read_rejects_zero_width() {
        let mut bytes = Bmp::new(2, 2, false).unwrap().to_bytes().unwrap();
        patch_u32(&mut bytes, 18, 0);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, BmpError::Format(FormatError::NonPositiveWidth(0))));
    }

    #[test]
    fn test_read_rejects_unsupported_bit_depth() {
        let mut bytes = Bmp::new(2, 2, false).unwrap().to_bytes().unwrap();
        bytes[28..30].copy_from_slice(&8u16.to_le_bytes());

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, BmpError::Format(FormatError::UnsupportedBitDepth(8))));
    }

    #[test]
    fn test_read_rejects_compressed_24_bit() {
        let mut bytes = Bmp::new(2, 2, false).unwrap().to_bytes().unwrap();
        patch_u32(&mut bytes, 30, 1);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::Format(FormatError::UnsupportedCompression { bit_count: 24, compression: 1 })
        ));
    }

    #[test]
    fn test_read_rejects_missing_color_header() {
        let mut bytes = Bmp::new(2, 2, true).unwrap().to_bytes().unwrap();
        patch_u32(&mut bytes, 14, INFO_HEADER_SIZE);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, BmpError::Format(FormatError::MissingColorHeader)));
    }

    #[test]
    fn test_read_rejects_unexpected_color_mask() {
        let mut bytes = Bmp::new(2, 2, true).unwrap().to_bytes().unwrap();
        patch_u32(&mut bytes, 54, 0x0000_00ff);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, BmpError::Format(FormatError::UnexpectedColorMask)));
    }

    #[test]
    fn test_read_rejects_unexpected_color_space() {
        let mut bytes = Bmp::new(2, 2, true).unwrap().to_bytes().unwrap();
        patch_u32(&mut bytes, 70, 0x5769_6E20);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::Format(FormatError::UnexpectedColorSpace(0x5769_6E20))
        ));
    }

    #[test]
    fn test_read_truncated_data() {
        let mut bytes = Bmp::new(3, 2, false).unwrap().to_bytes().unwrap();
        bytes.truncate(bytes.len() - 5);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::Format(FormatError::DataSizeMismatch { expected: 24, available: 19 })
        ));
    }

    #[test]
    fn test_read_truncated_header() {
        let mut bytes = Bmp::new(3, 2, false).unwrap().to_bytes().unwrap();
        bytes.truncate(20);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, BmpError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_read_rejects_dimensions_beyond_data() {
        let mut bytes = Bmp::new(2, 2, false).unwrap().to_bytes().unwrap();
        patch_u32(&mut bytes, 18, i32::MAX as u32);
        patch_u32(&mut bytes, 22, i32::MAX as u32);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::Format(FormatError::DataSizeMismatch { available: 16, .. })
        ));

        let mut bytes = Bmp::new(2, 2, true).unwrap().to_bytes().unwrap();
        patch_u32(&mut bytes, 18, 50_000);
        patch_u32(&mut bytes, 22, 50_000);

        let err = Bmp::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::Format(FormatError::DataSizeMismatch {
                expected: 10_000_000_000,
                available: 16,
            })
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let _ = env_logger::builder().is_test(true).try_init();

        let path = std::env::temp_dir().join(format!("lumen_bmp_round_trip_{}.bmp", std::process::id()));
        let image = patterned(5, 3, false);
        image.write(&path).unwrap();

        let decoded = Bmp::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_write_to_unopenable_path() {
        let image = Bmp::new(1, 1, false).unwrap();
        let path = std::env::temp_dir()
            .join("lumen_bmp_missing_dir")
            .join("nested")
            .join("out.bmp");

        assert!(matches!(image.write(&path), Err(BmpError::Io(_))));
        assert!(matches!(Bmp::read(&path), Err(BmpError::Io(_))));
    }
}
