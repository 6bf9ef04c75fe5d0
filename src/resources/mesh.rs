//! GPU meshes and their construction.
//!
//! This module provides:
//! - [`MeshBuilder`] - Uploads raw vertex (and optional index) bytes
//! - [`Mesh`] - A drawable mesh owning its vertex array and buffers
//! - [`create_mesh`] / [`create_indexed_mesh`] - Typed helpers over [`Vertex`] slices

use std::fmt;

use bytemuck::Pod;
use thiserror::Error;

use crate::backend::{
    BackendError, BufferDescriptor, BufferHandle, BufferUsage, GraphicsBackend, IndexFormat,
    PrimitiveTopology, VertexArrayHandle,
};

use super::vertex::{Vertex, VertexFormat};

/// Step of mesh construction that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshStage {
    VertexArray,
    VertexBuffer,
    IndexBuffer,
    Configure,
}

impl fmt::Display for MeshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshStage::VertexArray => "vertex array",
            MeshStage::VertexBuffer => "vertex buffer",
            MeshStage::IndexBuffer => "index buffer",
            MeshStage::Configure => "vertex attribute layout",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building a mesh.
///
/// No GPU object outlives a failed build.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("vertex format has no attributes")]
    EmptyFormat,
    #[error("vertex data too short: need {needed} bytes, got {actual}")]
    VertexDataTooShort { needed: usize, actual: usize },
    #[error("index data too short: need {needed} bytes, got {actual}")]
    IndexDataTooShort { needed: usize, actual: usize },
    #[error("{0} elements exceed the 32-bit draw count limit")]
    CountOverflow(usize),
    #[error("failed to create {stage}: {source}")]
    Construction {
        stage: MeshStage,
        #[source]
        source: BackendError,
    },
}

/// Variant-specific GPU state of a [`Mesh`].
#[derive(Debug, PartialEq, Eq)]
pub enum MeshKind {
    /// Non-indexed: draws `vertex_count` vertices.
    Vertex {
        vertex_buffer: BufferHandle,
        vertex_count: u32,
    },
    /// Indexed: draws `index_count` indices.
    Indexed {
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
        index_count: u32,
        index_format: IndexFormat,
    },
}

/// A mesh living on the GPU.
///
/// The mesh exclusively owns its vertex array and buffers. They are destroyed
/// by [`Mesh::release`], which must run before the backend's context goes
/// away. Dropping a mesh without releasing it leaks the GPU objects and logs a
/// warning.
#[derive(Debug)]
pub struct Mesh {
    vertex_array: VertexArrayHandle,
    topology: PrimitiveTopology,
    kind: MeshKind,
    label: Option<String>,
    released: bool,
}

static_assertions::assert_impl_all!(Mesh: Send, Sync);
static_assertions::assert_not_impl_any!(Mesh: Clone, Copy);

impl Mesh {
    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn kind(&self) -> &MeshKind {
        &self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.kind, MeshKind::Indexed { .. })
    }

    pub fn vertex_buffer(&self) -> BufferHandle {
        match self.kind {
            MeshKind::Vertex { vertex_buffer, .. } | MeshKind::Indexed { vertex_buffer, .. } => {
                vertex_buffer
            }
        }
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        match self.kind {
            MeshKind::Vertex { .. } => None,
            MeshKind::Indexed { index_buffer, .. } => Some(index_buffer),
        }
    }

    /// Number of vertices (non-indexed) or indices (indexed) one draw covers.
    pub fn element_count(&self) -> u32 {
        match self.kind {
            MeshKind::Vertex { vertex_count, .. } => vertex_count,
            MeshKind::Indexed { index_count, .. } => index_count,
        }
    }

    /// Issue one draw call covering the whole mesh.
    pub fn draw<B: GraphicsBackend + ?Sized>(&self, backend: &mut B) {
        match self.kind {
            MeshKind::Vertex { vertex_count, .. } => {
                backend.draw(self.vertex_array, self.topology, vertex_count);
            }
            MeshKind::Indexed {
                index_count,
                index_format,
                ..
            } => {
                backend.draw_indexed(self.vertex_array, self.topology, index_count, index_format);
            }
        }
    }

    /// Destroy the GPU objects: index buffer, vertex buffer, then vertex array.
    pub fn release<B: GraphicsBackend + ?Sized>(mut self, backend: &mut B) {
        match self.kind {
            MeshKind::Vertex { vertex_buffer, .. } => {
                backend.destroy_buffer(vertex_buffer);
            }
            MeshKind::Indexed {
                vertex_buffer,
                index_buffer,
                ..
            } => {
                backend.destroy_buffer(index_buffer);
                backend.destroy_buffer(vertex_buffer);
            }
        }
        backend.destroy_vertex_array(self.vertex_array);
        log::trace!("released mesh {:?}", self.label);
        self.released = true;
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "mesh {:?} dropped without release, leaking vertex array {}",
                self.label,
                self.vertex_array.raw()
            );
        }
    }
}

// ============================================================================
// Mesh Builder
// ============================================================================

struct IndexData<'a> {
    bytes: &'a [u8],
    count: u32,
    format: IndexFormat,
}

/// Builds a [`Mesh`] from raw vertex and index bytes.
///
/// # Example
///
/// ```ignore
/// let mesh = MeshBuilder::new(
///     PrimitiveTopology::Triangles,
///     bytemuck::cast_slice(&vertices),
///     vertices.len() as u32,
///     VertexFormat::position_normal(),
/// )
/// .with_indices(bytemuck::cast_slice(&indices), indices.len() as u32, IndexFormat::Uint16)
/// .with_label("floor")
/// .build(&mut backend)?;
/// ```
pub struct MeshBuilder<'a> {
    topology: PrimitiveTopology,
    vertices: &'a [u8],
    vertex_count: u32,
    format: &'a VertexFormat,
    indices: Option<IndexData<'a>>,
    label: Option<String>,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(
        topology: PrimitiveTopology,
        vertices: &'a [u8],
        vertex_count: u32,
        format: &'a VertexFormat,
    ) -> Self {
        Self {
            topology,
            vertices,
            vertex_count,
            format,
            indices: None,
            label: None,
        }
    }

    /// Make the mesh indexed.
    pub fn with_indices(mut self, bytes: &'a [u8], count: u32, format: IndexFormat) -> Self {
        self.indices = Some(IndexData {
            bytes,
            count,
            format,
        });
        self
    }

    /// Set a debug label, also used for the buffer labels.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Create the vertex array and buffers and return the finished mesh.
    ///
    /// Input longer than `count x size` is truncated. On failure every GPU
    /// object created so far is destroyed again, newest first.
    pub fn build<B: GraphicsBackend + ?Sized>(self, backend: &mut B) -> Result<Mesh, MeshError> {
        if self.format.is_empty() {
            return Err(MeshError::EmptyFormat);
        }

        let vertex_len = self.vertex_count as usize * self.format.size();
        if self.vertices.len() < vertex_len {
            return Err(MeshError::VertexDataTooShort {
                needed: vertex_len,
                actual: self.vertices.len(),
            });
        }
        let vertex_bytes = &self.vertices[..vertex_len];

        let index_bytes = match &self.indices {
            Some(indices) => {
                let index_len = indices.count as usize * indices.format.size();
                if indices.bytes.len() < index_len {
                    return Err(MeshError::IndexDataTooShort {
                        needed: index_len,
                        actual: indices.bytes.len(),
                    });
                }
                Some(&indices.bytes[..index_len])
            }
            None => None,
        };

        let mut guard = Unwind::new(backend);

        let vertex_array = guard
            .backend
            .create_vertex_array()
            .map_err(|source| MeshError::Construction {
                stage: MeshStage::VertexArray,
                source,
            })?;
        guard.vertex_array = Some(vertex_array);

        let desc = self.buffer_descriptor(vertex_len, BufferUsage::VERTEX, "vertices");
        let vertex_buffer = guard
            .backend
            .create_buffer_init(&desc, vertex_bytes)
            .map_err(|source| MeshError::Construction {
                stage: MeshStage::VertexBuffer,
                source,
            })?;
        guard.buffers.push(vertex_buffer);

        let index_buffer = match index_bytes {
            Some(bytes) => {
                let desc = self.buffer_descriptor(bytes.len(), BufferUsage::INDEX, "indices");
                let buffer = guard
                    .backend
                    .create_buffer_init(&desc, bytes)
                    .map_err(|source| MeshError::Construction {
                        stage: MeshStage::IndexBuffer,
                        source,
                    })?;
                guard.buffers.push(buffer);
                Some(buffer)
            }
            None => None,
        };

        guard
            .backend
            .configure_vertex_array(vertex_array, vertex_buffer, index_buffer, self.format)
            .map_err(|source| MeshError::Construction {
                stage: MeshStage::Configure,
                source,
            })?;
        guard.disarm();

        let kind = match (index_buffer, &self.indices) {
            (Some(index_buffer), Some(indices)) => MeshKind::Indexed {
                vertex_buffer,
                index_buffer,
                index_count: indices.count,
                index_format: indices.format,
            },
            _ => MeshKind::Vertex {
                vertex_buffer,
                vertex_count: self.vertex_count,
            },
        };

        log::debug!(
            "built mesh {:?}: {:?}, {} vertices of {} bytes{}",
            self.label,
            self.topology,
            self.vertex_count,
            self.format.size(),
            match &self.indices {
                Some(indices) => format!(", {} {:?} indices", indices.count, indices.format),
                None => String::new(),
            }
        );

        Ok(Mesh {
            vertex_array,
            topology: self.topology,
            kind,
            label: self.label,
            released: false,
        })
    }

    fn buffer_descriptor(&self, size: usize, usage: BufferUsage, suffix: &str) -> BufferDescriptor {
        let desc = BufferDescriptor::new(size as u64, usage);
        match &self.label {
            Some(label) => desc.with_label(format!("{label} {suffix}")),
            None => desc,
        }
    }
}

/// Destroys partially built GPU objects unless disarmed.
struct Unwind<'b, B: GraphicsBackend + ?Sized> {
    backend: &'b mut B,
    vertex_array: Option<VertexArrayHandle>,
    buffers: Vec<BufferHandle>,
    armed: bool,
}

impl<'b, B: GraphicsBackend + ?Sized> Unwind<'b, B> {
    fn new(backend: &'b mut B) -> Self {
        Self {
            backend,
            vertex_array: None,
            buffers: Vec::new(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<B: GraphicsBackend + ?Sized> Drop for Unwind<'_, B> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        while let Some(buffer) = self.buffers.pop() {
            self.backend.destroy_buffer(buffer);
        }
        if let Some(vertex_array) = self.vertex_array.take() {
            self.backend.destroy_vertex_array(vertex_array);
        }
    }
}

// ============================================================================
// Typed Construction
// ============================================================================

/// Scalar types usable as mesh indices.
pub trait Index: Pod {
    const FORMAT: IndexFormat;
}

impl Index for u8 {
    const FORMAT: IndexFormat = IndexFormat::Uint8;
}

impl Index for u16 {
    const FORMAT: IndexFormat = IndexFormat::Uint16;
}

impl Index for u32 {
    const FORMAT: IndexFormat = IndexFormat::Uint32;
}

fn count_u32(len: usize) -> Result<u32, MeshError> {
    u32::try_from(len).map_err(|_| MeshError::CountOverflow(len))
}

/// Build a non-indexed mesh from vertex records.
pub fn create_mesh<V: Vertex, B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    topology: PrimitiveTopology,
    vertices: &[V],
) -> Result<Mesh, MeshError> {
    MeshBuilder::new(
        topology,
        bytemuck::cast_slice(vertices),
        count_u32(vertices.len())?,
        V::format(),
    )
    .build(backend)
}

/// Build an indexed mesh from vertex records and indices.
pub fn create_indexed_mesh<V: Vertex, I: Index, B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    topology: PrimitiveTopology,
    vertices: &[V],
    indices: &[I],
) -> Result<Mesh, MeshError> {
    MeshBuilder::new(
        topology,
        bytemuck::cast_slice(vertices),
        count_u32(vertices.len())?,
        V::format(),
    )
    .with_indices(
        bytemuck::cast_slice(indices),
        count_u32(indices.len())?,
        I::FORMAT,
    )
    .build(backend)
}
