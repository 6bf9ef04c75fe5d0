//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It keeps every object
//! it creates in memory so tests can inspect buffer contents, count live
//! objects and verify that nothing leaks. Failures can be injected at any
//! creation step to exercise error unwinding.

use std::collections::HashMap;

use crate::resources::VertexFormat;

use super::traits::*;
use super::types::*;

/// A creation step the dummy backend can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    /// `create_vertex_array`
    VertexArray,
    /// `create_buffer_init` with [`BufferUsage::VERTEX`]
    VertexBuffer,
    /// `create_buffer_init` with [`BufferUsage::INDEX`]
    IndexBuffer,
    /// `configure_vertex_array`
    Configure,
    /// `create_texture`
    Texture,
    /// `write_texture`
    TextureUpload,
}

/// A draw call recorded by the dummy backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_array: VertexArrayHandle,
    pub topology: PrimitiveTopology,
    pub count: u32,
    /// `None` for non-indexed draws.
    pub index_format: Option<IndexFormat>,
}

/// Simulated buffer object.
#[derive(Debug, Clone)]
pub struct DummyBuffer {
    pub label: Option<String>,
    pub usage: BufferUsage,
    pub data: Vec<u8>,
}

/// Simulated vertex array object.
#[derive(Debug, Clone, Default)]
pub struct DummyVertexArray {
    pub vertex_buffer: Option<BufferHandle>,
    pub index_buffer: Option<BufferHandle>,
    pub format: Option<VertexFormat>,
}

/// Simulated texture object.
#[derive(Debug, Clone)]
pub struct DummyTexture {
    pub descriptor: TextureDescriptor,
    /// Uploaded data per mip level.
    pub levels: Vec<Option<Vec<u8>>>,
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    next_handle: u64,
    buffers: HashMap<u64, DummyBuffer>,
    vertex_arrays: HashMap<u64, DummyVertexArray>,
    textures: HashMap<u64, DummyTexture>,
    draw_calls: Vec<DrawCall>,
    invalid_releases: usize,
    failure: Option<FailurePoint>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call at `point` fail until [`clear_failure`](Self::clear_failure).
    pub fn fail_at(&mut self, point: FailurePoint) {
        self.failure = Some(point);
    }

    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    fn check_failure(&self, point: FailurePoint) -> BackendResult<()> {
        if self.failure != Some(point) {
            return Ok(());
        }
        log::trace!("DummyBackend: injected failure at {:?}", point);
        Err(match point {
            FailurePoint::VertexArray => {
                BackendError::VertexArrayCreationFailed("injected failure".to_string())
            }
            FailurePoint::VertexBuffer | FailurePoint::IndexBuffer => {
                BackendError::BufferCreationFailed("injected failure".to_string())
            }
            FailurePoint::Configure => BackendError::ApiError("injected failure".to_string()),
            FailurePoint::Texture => {
                BackendError::TextureCreationFailed("injected failure".to_string())
            }
            FailurePoint::TextureUpload => {
                BackendError::TextureUploadFailed("injected failure".to_string())
            }
        })
    }

    fn allocate_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Total number of live GPU objects of any kind.
    pub fn live_objects(&self) -> usize {
        self.live_buffers() + self.live_vertex_arrays() + self.live_textures()
    }

    /// Number of destroy calls on handles that were not alive.
    pub fn invalid_releases(&self) -> usize {
        self.invalid_releases
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&DummyBuffer> {
        self.buffers.get(&handle.0)
    }

    pub fn vertex_array(&self, handle: VertexArrayHandle) -> Option<&DummyVertexArray> {
        self.vertex_arrays.get(&handle.0)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&DummyTexture> {
        self.textures.get(&handle.0)
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    pub fn clear_draw_calls(&mut self) {
        self.draw_calls.clear();
    }
}

impl GraphicsBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle> {
        self.check_failure(FailurePoint::VertexArray)?;
        let id = self.allocate_handle();
        self.vertex_arrays.insert(id, DummyVertexArray::default());
        log::trace!("DummyBackend: creating vertex array {}", id);
        Ok(VertexArrayHandle(id))
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        if desc.usage.contains(BufferUsage::INDEX) {
            self.check_failure(FailurePoint::IndexBuffer)?;
        } else {
            self.check_failure(FailurePoint::VertexBuffer)?;
        }
        if data.len() as u64 != desc.size {
            return Err(BackendError::BufferUploadFailed(format!(
                "descriptor size {} does not match {} bytes of data",
                desc.size,
                data.len()
            )));
        }

        let id = self.allocate_handle();
        log::trace!(
            "DummyBackend: creating buffer {} {:?} (size: {})",
            id,
            desc.label,
            desc.size
        );
        self.buffers.insert(
            id,
            DummyBuffer {
                label: desc.label.clone(),
                usage: desc.usage,
                data: data.to_vec(),
            },
        );
        Ok(BufferHandle(id))
    }

    fn configure_vertex_array(
        &mut self,
        vertex_array: VertexArrayHandle,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        format: &VertexFormat,
    ) -> BackendResult<()> {
        self.check_failure(FailurePoint::Configure)?;

        let referenced = std::iter::once(vertex_buffer).chain(index_buffer);
        for buffer in referenced {
            if !self.buffers.contains_key(&buffer.0) {
                return Err(BackendError::InvalidHandle(format!("buffer {}", buffer.0)));
            }
        }
        let state = self
            .vertex_arrays
            .get_mut(&vertex_array.0)
            .ok_or_else(|| BackendError::InvalidHandle(format!("vertex array {}", vertex_array.0)))?;

        state.vertex_buffer = Some(vertex_buffer);
        state.index_buffer = index_buffer;
        state.format = Some(format.clone());
        log::trace!(
            "DummyBackend: configured vertex array {} with {} attributes",
            vertex_array.0,
            format.len()
        );
        Ok(())
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        self.check_failure(FailurePoint::Texture)?;
        if desc.width == 0 || desc.height == 0 || desc.mip_levels == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "invalid texture size {}x{} with {} levels",
                desc.width, desc.height, desc.mip_levels
            )));
        }

        let id = self.allocate_handle();
        log::trace!(
            "DummyBackend: creating texture {} {:?} ({}x{}, {} levels)",
            id,
            desc.label,
            desc.width,
            desc.height,
            desc.mip_levels
        );
        self.textures.insert(
            id,
            DummyTexture {
                descriptor: desc.clone(),
                levels: vec![None; desc.mip_levels as usize],
            },
        );
        Ok(TextureHandle(id))
    }

    fn write_texture(
        &mut self,
        texture: TextureHandle,
        level: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> BackendResult<()> {
        self.check_failure(FailurePoint::TextureUpload)?;
        let state = self
            .textures
            .get_mut(&texture.0)
            .ok_or_else(|| BackendError::InvalidHandle(format!("texture {}", texture.0)))?;

        let expected =
            width as usize * height as usize * state.descriptor.format.bytes_per_pixel() as usize;
        if data.len() != expected {
            return Err(BackendError::TextureUploadFailed(format!(
                "level {} expects {} bytes, got {}",
                level,
                expected,
                data.len()
            )));
        }
        let slot = state.levels.get_mut(level as usize).ok_or_else(|| {
            BackendError::TextureUploadFailed(format!("mip level {} out of range", level))
        })?;

        log::trace!(
            "DummyBackend: write_texture {} level={} ({}x{}) len={}",
            texture.0,
            level,
            width,
            height,
            data.len()
        );
        *slot = Some(data.to_vec());
        Ok(())
    }

    fn draw(&mut self, vertex_array: VertexArrayHandle, topology: PrimitiveTopology, vertex_count: u32) {
        log::trace!(
            "DummyBackend: draw {:?} vertices={} vao={}",
            topology,
            vertex_count,
            vertex_array.0
        );
        self.draw_calls.push(DrawCall {
            vertex_array,
            topology,
            count: vertex_count,
            index_format: None,
        });
    }

    fn draw_indexed(
        &mut self,
        vertex_array: VertexArrayHandle,
        topology: PrimitiveTopology,
        index_count: u32,
        format: IndexFormat,
    ) {
        log::trace!(
            "DummyBackend: draw_indexed {:?} indices={} ({:?}) vao={}",
            topology,
            index_count,
            format,
            vertex_array.0
        );
        self.draw_calls.push(DrawCall {
            vertex_array,
            topology,
            count: index_count,
            index_format: Some(format),
        });
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer.0).is_some() {
            log::trace!("DummyBackend: destroyed buffer {}", buffer.0);
        } else {
            log::error!("DummyBackend: buffer {} released twice or never created", buffer.0);
            self.invalid_releases += 1;
        }
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_arrays.remove(&vertex_array.0).is_some() {
            log::trace!("DummyBackend: destroyed vertex array {}", vertex_array.0);
        } else {
            log::error!(
                "DummyBackend: vertex array {} released twice or never created",
                vertex_array.0
            );
            self.invalid_releases += 1;
        }
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture.0).is_some() {
            log::trace!("DummyBackend: destroyed texture {}", texture.0);
        } else {
            log::error!("DummyBackend: texture {} released twice or never created", texture.0);
            self.invalid_releases += 1;
        }
    }
}
