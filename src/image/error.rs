//! Image error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding an image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("unexpected end of image data at offset {offset}: needed {needed} bytes, {available} available")]
    DecodeOverrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("RLE packet of {count} pixels at pixel {position} runs past the end of a {total} pixel image")]
    RleOverflow {
        position: usize,
        count: usize,
        total: usize,
    },
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

pub type ImageResult<T> = Result<T, ImageError>;

/// Reasons mipmap generation can be refused.
///
/// A refused generation never modifies the existing chain.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipmapError {
    #[error("cannot generate mipmaps for an empty pixel buffer")]
    Empty,
    #[error("mipmap generation requires power-of-two dimensions, got {width}x{height}")]
    NotPowerOfTwo { width: u32, height: u32 },
    #[error("mipmap chain already generated")]
    AlreadyGenerated,
}
