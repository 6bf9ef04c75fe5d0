//! Core backend abstraction traits
//!
//! The mesh and texture layers only talk to the GPU through
//! [`GraphicsBackend`]. Every method assumes the backend's context is current
//! on the calling thread.

use crate::backend::types::*;
use crate::resources::VertexFormat;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to create vertex array: {0}")]
    VertexArrayCreationFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to upload buffer data: {0}")]
    BufferUploadFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to upload texture data: {0}")]
    TextureUploadFailed(String),
    #[error("Graphics API error: {0}")]
    ApiError(String),
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a vertex array object (attribute layout plus bound buffers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub(crate) u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

impl BufferHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl VertexArrayHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl TextureHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Main graphics backend trait
pub trait GraphicsBackend {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    // Resource creation

    /// Create an empty vertex array object
    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle>;

    /// Create a buffer with initial data
    fn create_buffer_init(&mut self, desc: &BufferDescriptor, data: &[u8])
        -> BackendResult<BufferHandle>;

    /// Record the vertex buffer, optional index buffer and attribute layout
    /// in a vertex array object
    fn configure_vertex_array(
        &mut self,
        vertex_array: VertexArrayHandle,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        format: &VertexFormat,
    ) -> BackendResult<()>;

    /// Create a 2D texture with storage for `desc.mip_levels` levels
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle>;

    /// Upload one mip level of a texture
    fn write_texture(
        &mut self,
        texture: TextureHandle,
        level: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> BackendResult<()>;

    // Drawing

    /// Draw `vertex_count` vertices starting at 0
    fn draw(&mut self, vertex_array: VertexArrayHandle, topology: PrimitiveTopology, vertex_count: u32);

    /// Draw `index_count` indices starting at 0
    fn draw_indexed(
        &mut self,
        vertex_array: VertexArrayHandle,
        topology: PrimitiveTopology,
        index_count: u32,
        format: IndexFormat,
    );

    // Resource cleanup

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Destroy a vertex array object
    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);
}
