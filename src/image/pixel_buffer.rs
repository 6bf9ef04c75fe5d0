//! CPU-side pixel storage with an attached mipmap chain.

use super::error::{ImageError, ImageResult};

/// One generated mipmap level (level 1 and above).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MipLevel {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

/// Borrowed view of a single mipmap level.
///
/// Level 0 borrows the primary pixel data of the [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevelRef<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// A decoded 2D image.
///
/// Channels are stored as R,G,B[,A] (or a single gray channel), rows top to
/// bottom with no padding. The buffer is "good" only while it holds pixels;
/// a default-constructed buffer is empty.
///
/// # Example
///
/// ```ignore
/// let mut image = texmesh::load_targa("textures/crate.tga")?;
/// image.generate_mipmaps(1)?;
/// for level in 0..image.mip_level_count() {
///     let mip = image.mip_level(level).unwrap();
///     println!("{}x{}", mip.width, mip.height);
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
    data: Vec<u8>,
    pub(crate) mipmaps: Vec<MipLevel>,
}

impl PixelBuffer {
    /// Create an empty pixel buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zero-filled pixel buffer of the given size.
    pub fn with_size(width: u32, height: u32, bytes_per_pixel: u32) -> ImageResult<Self> {
        let mut buffer = Self::new();
        buffer.allocate(width, height, bytes_per_pixel)?;
        Ok(buffer)
    }

    /// (Re)allocate the pixel storage.
    ///
    /// Any previous pixels and every mipmap level are dropped. A zero width or
    /// height leaves the buffer empty.
    pub fn allocate(&mut self, width: u32, height: u32, bytes_per_pixel: u32) -> ImageResult<()> {
        if !(1..=4).contains(&bytes_per_pixel) {
            return Err(ImageError::UnsupportedFormat(format!(
                "{bytes_per_pixel} bytes per pixel"
            )));
        }

        self.deallocate();
        if width == 0 || height == 0 {
            return Ok(());
        }

        let len = width as usize * height as usize * bytes_per_pixel as usize;
        self.data = vec![0; len];
        self.width = width;
        self.height = height;
        self.bytes_per_pixel = bytes_per_pixel;
        Ok(())
    }

    /// Free the pixels and the mipmap chain, returning to the empty state.
    pub fn deallocate(&mut self) {
        self.data = Vec::new();
        self.mipmaps.clear();
        self.width = 0;
        self.height = 0;
        self.bytes_per_pixel = 0;
    }

    /// Whether the buffer holds pixel data.
    pub fn is_good(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.bytes_per_pixel
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bytes_per_pixel * 8
    }

    /// Bytes in one row of the full-resolution image.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.bytes_per_pixel as usize
    }

    /// Full-resolution pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable full-resolution pixel data.
    ///
    /// Generated mipmap levels are not refreshed by writes through this slice.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes of the pixel at `(x, y)`, or `None` if out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.bytes_per_pixel as usize;
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        self.data.get(start..start + bpp)
    }

    /// Number of mipmap levels including level 0.
    ///
    /// An empty buffer has no levels.
    pub fn mip_level_count(&self) -> usize {
        if self.is_good() {
            1 + self.mipmaps.len()
        } else {
            0
        }
    }

    /// Whether levels beyond level 0 have been generated.
    pub fn has_mipmaps(&self) -> bool {
        !self.mipmaps.is_empty()
    }

    /// Get a mipmap level. Level 0 is the full-resolution image.
    pub fn mip_level(&self, level: usize) -> Option<MipLevelRef<'_>> {
        if !self.is_good() {
            return None;
        }
        if level == 0 {
            return Some(MipLevelRef {
                width: self.width,
                height: self.height,
                data: &self.data,
            });
        }
        self.mipmaps.get(level - 1).map(|mip| MipLevelRef {
            width: mip.width,
            height: mip.height,
            data: &mip.data,
        })
    }

    /// Iterate over every level, starting with level 0.
    pub fn mip_levels(&self) -> impl Iterator<Item = MipLevelRef<'_>> {
        (0..self.mip_level_count()).filter_map(move |level| self.mip_level(level))
    }

    /// Drop every generated level, keeping level 0.
    pub fn clear_mipmaps(&mut self) {
        self.mipmaps.clear();
    }
}
