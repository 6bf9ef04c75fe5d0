//! Resource management
//!
//! Vertex formats, GPU meshes, textures and the prefab shapes built from them.

mod mesh;
pub mod prefabs;
mod texture;
mod texture_cache;
mod vertex;

pub use mesh::*;
pub use texture::*;
pub use texture_cache::TextureCache;
pub use vertex::*;
