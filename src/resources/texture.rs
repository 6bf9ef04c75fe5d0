//! Texture upload
//!
//! Turns a decoded [`PixelBuffer`] (and its mipmap chain) into a GPU texture.

use std::path::Path;

use thiserror::Error;

use crate::backend::{BackendError, GraphicsBackend, TextureDescriptor, TextureFormat, TextureHandle};
use crate::image::{load_targa, ImageError, MipmapError, PixelBuffer};
use crate::TextureConfig;

/// Errors that can occur while loading or uploading a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("cannot upload an empty pixel buffer")]
    EmptyImage,
    #[error("no texture format for {0} bytes per pixel")]
    UnsupportedPixelSize(u32),
}

/// A texture living on the GPU.
///
/// Like meshes, textures are destroyed explicitly through
/// [`GpuTexture::release`].
#[derive(Debug)]
pub struct GpuTexture {
    handle: TextureHandle,
    width: u32,
    height: u32,
    format: TextureFormat,
    mip_levels: u32,
    label: Option<String>,
    released: bool,
}

impl GpuTexture {
    /// Upload a pixel buffer, including every generated mipmap level.
    pub fn from_pixels<B: GraphicsBackend + ?Sized>(
        backend: &mut B,
        pixels: &PixelBuffer,
        label: Option<&str>,
    ) -> Result<Self, TextureError> {
        if !pixels.is_good() {
            return Err(TextureError::EmptyImage);
        }
        let format = TextureFormat::from_bytes_per_pixel(pixels.bytes_per_pixel())
            .ok_or(TextureError::UnsupportedPixelSize(pixels.bytes_per_pixel()))?;
        let mip_levels = pixels.mip_level_count() as u32;

        let mut desc =
            TextureDescriptor::new(pixels.width(), pixels.height(), format).with_mip_levels(mip_levels);
        if let Some(label) = label {
            desc = desc.with_label(label);
        }
        let handle = backend.create_texture(&desc)?;

        for (level, mip) in pixels.mip_levels().enumerate() {
            if let Err(err) = backend.write_texture(handle, level as u32, mip.width, mip.height, mip.data) {
                backend.destroy_texture(handle);
                return Err(err.into());
            }
        }

        log::debug!(
            "uploaded texture {:?}: {}x{} {:?}, {} levels",
            label,
            pixels.width(),
            pixels.height(),
            format,
            mip_levels
        );

        Ok(Self {
            handle,
            width: pixels.width(),
            height: pixels.height(),
            format,
            mip_levels,
            label: label.map(str::to_string),
            released: false,
        })
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Destroy the GPU texture.
    pub fn release<B: GraphicsBackend + ?Sized>(mut self, backend: &mut B) {
        backend.destroy_texture(self.handle);
        self.released = true;
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "texture {:?} dropped without release, leaking texture {}",
                self.label,
                self.handle.raw()
            );
        }
    }
}

/// Decode a TGA file, optionally build its mipmap chain, and upload it.
///
/// Mipmaps are generated when `config.generate_mipmaps` is set. Images whose
/// dimensions are not powers of two are uploaded with a single level.
pub fn load_texture<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    path: impl AsRef<Path>,
    config: &TextureConfig,
) -> Result<GpuTexture, TextureError> {
    let path = path.as_ref();
    let mut pixels = load_targa(path)?;

    if config.generate_mipmaps {
        match pixels.generate_mipmaps(config.min_mip_size) {
            Ok(levels) => log::trace!("{}: {} mipmap levels", path.display(), levels),
            Err(err @ MipmapError::NotPowerOfTwo { .. }) => {
                log::warn!("{}: {}, uploading without mipmaps", path.display(), err);
            }
            Err(err) => log::warn!("{}: skipping mipmaps: {}", path.display(), err),
        }
    }

    let label = path.file_name().and_then(|name| name.to_str());
    GpuTexture::from_pixels(backend, &pixels, label)
}
