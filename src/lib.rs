//! texmesh - TGA textures and GPU meshes for small OpenGL demos
//!
//! This crate covers the two pieces of a demo toolkit that do real work
//! rather than forwarding to the graphics API:
//! - **Images**: TGA decoding (uncompressed and RLE, 8/24/32 bit) into a
//!   [`PixelBuffer`], plus box-filtered mipmap chains
//! - **Meshes**: vertex formats with built-in presets and a [`MeshBuilder`]
//!   that realizes raw vertex/index data as drawable [`Mesh`]es
//!
//! GPU access goes through the [`GraphicsBackend`] trait. [`DummyBackend`]
//! simulates a GPU in memory; the `gl-backend` feature adds an OpenGL
//! implementation for a context the caller has made current.

pub mod backend;
pub mod image;
pub mod resources;

use std::path::PathBuf;

pub use backend::{DummyBackend, GraphicsBackend, IndexFormat, PrimitiveTopology};
pub use crate::image::{decode_targa, load_targa, ImageError, MipmapError, PixelBuffer};
pub use resources::{
    create_indexed_mesh, create_mesh, load_texture, GpuTexture, Mesh, MeshBuilder, MeshError,
    TextureCache, TextureError, Vertex, VertexAttrib, VertexFormat,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the crate version. The caller installs the logger.
pub fn init() {
    log::info!("texmesh v{}", VERSION);
}

/// Configuration for loading textures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureConfig {
    /// Directory texture file names are resolved against
    pub root_dir: PathBuf,
    /// Generate a mipmap chain for power-of-two images
    pub generate_mipmaps: bool,
    /// Smallest mipmap dimension to generate
    pub min_mip_size: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./"),
            generate_mipmaps: true,
            min_mip_size: 1,
        }
    }
}

impl TextureConfig {
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_mipmaps(mut self, generate_mipmaps: bool) -> Self {
        self.generate_mipmaps = generate_mipmaps;
        self
    }

    pub fn with_min_mip_size(mut self, min_mip_size: u32) -> Self {
        self.min_mip_size = min_mip_size;
        self
    }
}
