//! Truevision TGA decoding.
//!
//! Supports uncompressed and run-length encoded true-color (8/24/32 bit) and
//! grayscale images. Color-mapped images and right-to-left pixel order are
//! rejected. Output pixels are always R,G,B[,A] rows from top to bottom.

use std::path::Path;

use super::error::{ImageError, ImageResult};
use super::pixel_buffer::PixelBuffer;

/// Size of the fixed TGA header in bytes.
pub const HEADER_SIZE: usize = 18;

/// Descriptor bit for right-to-left pixel order.
const DESCRIPTOR_RIGHT_TO_LEFT: u8 = 0x10;
/// Descriptor bit for bottom-to-top row order.
const DESCRIPTOR_BOTTOM_TO_TOP: u8 = 0x20;

/// TGA image type codes this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargaImageType {
    /// Uncompressed true-color (2)
    TrueColor,
    /// Uncompressed grayscale (3)
    Grayscale,
    /// Run-length encoded true-color (10)
    RleTrueColor,
    /// Run-length encoded grayscale (11)
    RleGrayscale,
}

impl TargaImageType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(Self::TrueColor),
            3 => Some(Self::Grayscale),
            10 => Some(Self::RleTrueColor),
            11 => Some(Self::RleGrayscale),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::TrueColor => 2,
            Self::Grayscale => 3,
            Self::RleTrueColor => 10,
            Self::RleGrayscale => 11,
        }
    }

    pub fn is_rle(&self) -> bool {
        matches!(self, Self::RleTrueColor | Self::RleGrayscale)
    }
}

/// Parsed TGA header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargaHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: u8,
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub descriptor: u8,
}

impl TargaHeader {
    fn read(reader: &mut ByteReader<'_>) -> ImageResult<Self> {
        let id_length = reader.read_u8()?;
        let color_map_type = reader.read_u8()?;
        let image_type = reader.read_u8()?;
        reader.take(5)?; // color map specification
        let x_origin = reader.read_u16_le()?;
        let y_origin = reader.read_u16_le()?;
        let width = reader.read_u16_le()?;
        let height = reader.read_u16_le()?;
        let bits_per_pixel = reader.read_u8()?;
        let descriptor = reader.read_u8()?;

        Ok(Self {
            id_length,
            color_map_type,
            image_type,
            x_origin,
            y_origin,
            width,
            height,
            bits_per_pixel,
            descriptor,
        })
    }

    /// Whether rows are stored bottom row first.
    pub fn is_bottom_up(&self) -> bool {
        self.descriptor & DESCRIPTOR_BOTTOM_TO_TOP != 0
    }

    pub fn is_right_to_left(&self) -> bool {
        self.descriptor & DESCRIPTOR_RIGHT_TO_LEFT != 0
    }
}

/// Bounds-checked reader over the raw file bytes.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> ImageResult<&'a [u8]> {
        let available = self.data.len() - self.offset;
        if len > available {
            return Err(ImageError::DecodeOverrun {
                offset: self.offset,
                needed: len,
                available,
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> ImageResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16_le(&mut self) -> ImageResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// Maps file pixel order to output pixel order.
///
/// Tracks the linear pixel position in file order and resolves it to a byte
/// offset in the top-to-bottom output buffer.
struct PixelWriter<'a> {
    out: &'a mut [u8],
    width: usize,
    height: usize,
    bpp: usize,
    bottom_up: bool,
    position: usize,
}

impl<'a> PixelWriter<'a> {
    fn total(&self) -> usize {
        self.width * self.height
    }

    fn remaining(&self) -> usize {
        self.total() - self.position
    }

    /// Write one pixel given in file channel order, advancing the cursor.
    fn put(&mut self, src: &[u8]) {
        let row = self.position / self.width;
        let col = self.position % self.width;
        let dst_row = if self.bottom_up {
            self.height - 1 - row
        } else {
            row
        };
        let start = (dst_row * self.width + col) * self.bpp;
        let dst = &mut self.out[start..start + self.bpp];
        write_pixel(dst, src);
        self.position += 1;
    }
}

/// Copy one pixel, swapping B,G,R[,A] to R,G,B[,A] for color depths.
#[inline]
fn write_pixel(dst: &mut [u8], src: &[u8]) {
    match dst.len() {
        3 | 4 => {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            if dst.len() == 4 {
                dst[3] = src[3];
            }
        }
        _ => dst.copy_from_slice(src),
    }
}

/// Decode a TGA image from memory.
pub fn decode_targa(bytes: &[u8]) -> ImageResult<PixelBuffer> {
    let mut reader = ByteReader::new(bytes);
    let header = TargaHeader::read(&mut reader)?;

    let image_type = TargaImageType::from_code(header.image_type).ok_or_else(|| {
        ImageError::UnsupportedFormat(format!("TGA image type {}", header.image_type))
    })?;
    if header.is_right_to_left() {
        return Err(ImageError::UnsupportedFormat(
            "right-to-left TGA pixel order".to_string(),
        ));
    }
    if !matches!(header.bits_per_pixel, 8 | 24 | 32) {
        return Err(ImageError::UnsupportedFormat(format!(
            "{} bits per pixel",
            header.bits_per_pixel
        )));
    }
    if header.width == 0 || header.height == 0 {
        return Err(ImageError::InvalidDimensions {
            width: header.width as u32,
            height: header.height as u32,
        });
    }

    reader.take(header.id_length as usize)?;

    let bpp = header.bits_per_pixel as usize / 8;
    let mut image = PixelBuffer::with_size(header.width as u32, header.height as u32, bpp as u32)?;

    let mut writer = PixelWriter {
        out: image.data_mut(),
        width: header.width as usize,
        height: header.height as usize,
        bpp,
        bottom_up: header.is_bottom_up(),
        position: 0,
    };

    if image_type.is_rle() {
        decode_rle(&mut reader, &mut writer)?;
    } else {
        decode_uncompressed(&mut reader, &mut writer)?;
    }

    log::debug!(
        "decoded {}x{} TGA (type {}, {} bpp, {})",
        header.width,
        header.height,
        image_type.code(),
        header.bits_per_pixel,
        if header.is_bottom_up() { "bottom-up" } else { "top-down" }
    );

    Ok(image)
}

fn decode_uncompressed(reader: &mut ByteReader<'_>, writer: &mut PixelWriter<'_>) -> ImageResult<()> {
    let row_len = writer.width * writer.bpp;
    for _ in 0..writer.height {
        let row = reader.take(row_len)?;
        for src in row.chunks_exact(writer.bpp) {
            writer.put(src);
        }
    }
    Ok(())
}

fn decode_rle(reader: &mut ByteReader<'_>, writer: &mut PixelWriter<'_>) -> ImageResult<()> {
    let bpp = writer.bpp;
    while writer.remaining() > 0 {
        let packet = reader.read_u8()?;
        let (is_run, count) = if packet > 127 {
            (true, packet as usize - 127)
        } else {
            (false, packet as usize + 1)
        };

        if count > writer.remaining() {
            return Err(ImageError::RleOverflow {
                position: writer.position,
                count,
                total: writer.total(),
            });
        }

        if is_run {
            let src = reader.take(bpp)?;
            for _ in 0..count {
                writer.put(src);
            }
        } else {
            let pixels = reader.take(count * bpp)?;
            for src in pixels.chunks_exact(bpp) {
                writer.put(src);
            }
        }
    }
    Ok(())
}

/// Read and decode a TGA file.
pub fn load_targa(path: impl AsRef<Path>) -> ImageResult<PixelBuffer> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_targa(&bytes)
}
