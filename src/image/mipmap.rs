//! Mipmap chain generation by 2x2 box filtering.

use super::error::MipmapError;
use super::pixel_buffer::{MipLevel, PixelBuffer};

impl PixelBuffer {
    /// Generate the mipmap chain below level 0.
    ///
    /// Each level halves the previous one; every output byte is the truncated
    /// mean of the same channel in the 2x2 source block. Generation stops
    /// before either dimension drops below `min_size` (clamped to at least 1).
    ///
    /// Returns the number of levels added. Both dimensions must be powers of
    /// two and no chain may exist yet; call [`PixelBuffer::clear_mipmaps`]
    /// first to regenerate.
    pub fn generate_mipmaps(&mut self, min_size: u32) -> Result<usize, MipmapError> {
        if !self.is_good() {
            return Err(MipmapError::Empty);
        }
        if !self.width().is_power_of_two() || !self.height().is_power_of_two() {
            return Err(MipmapError::NotPowerOfTwo {
                width: self.width(),
                height: self.height(),
            });
        }
        if self.has_mipmaps() {
            return Err(MipmapError::AlreadyGenerated);
        }

        let min_size = min_size.max(1);
        let bpp = self.bytes_per_pixel() as usize;

        let mut levels = Vec::new();
        let mut src_width = self.width();
        let mut dst_width = src_width >> 1;
        let mut dst_height = self.height() >> 1;

        while dst_width >= min_size && dst_height >= min_size {
            let src = levels
                .last()
                .map(|level: &MipLevel| level.data.as_slice())
                .unwrap_or(self.data());
            let data = downsample(src, src_width as usize, bpp, dst_width as usize, dst_height as usize);

            levels.push(MipLevel {
                width: dst_width,
                height: dst_height,
                data,
            });

            src_width = dst_width;
            dst_width >>= 1;
            dst_height >>= 1;
        }

        log::debug!(
            "generated {} mipmap levels below {}x{} (min size {})",
            levels.len(),
            self.width(),
            self.height(),
            min_size
        );

        let added = levels.len();
        self.mipmaps = levels;
        Ok(added)
    }
}

/// Halve an image whose source rows are `src_width` pixels wide.
fn downsample(src: &[u8], src_width: usize, bpp: usize, dst_width: usize, dst_height: usize) -> Vec<u8> {
    let src_stride = src_width * bpp;
    let mut dst = Vec::with_capacity(dst_width * dst_height * bpp);

    for j in 0..dst_height {
        let row1 = &src[2 * j * src_stride..(2 * j + 1) * src_stride];
        let row2 = &src[(2 * j + 1) * src_stride..(2 * j + 2) * src_stride];

        for i in 0..dst_width {
            let left = 2 * i * bpp;
            let right = left + bpp;
            for c in 0..bpp {
                let sum = row1[left + c] as u32
                    + row1[right + c] as u32
                    + row2[left + c] as u32
                    + row2[right + c] as u32;
                dst.push((sum / 4) as u8);
            }
        }
    }

    dst
}
