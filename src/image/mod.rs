//! Image decoding and mipmap generation
//!
//! Decoded images live in a [`PixelBuffer`]; [`decode_targa`] and
//! [`load_targa`] produce them from TGA data.

mod error;
mod mipmap;
mod pixel_buffer;
pub mod targa;

pub use error::{ImageError, ImageResult, MipmapError};
pub use pixel_buffer::{MipLevelRef, PixelBuffer};
pub use targa::{decode_targa, load_targa, TargaHeader, TargaImageType};
