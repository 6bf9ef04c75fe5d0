//! OpenGL backend built on the `gl` crate.
//!
//! The caller owns the context: it must be current on the calling thread and
//! its function pointers loaded with `gl::load_with` before any call into this
//! backend.

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr};

use crate::resources::{ComponentType, VertexFormat};

use super::traits::*;
use super::types::*;

/// OpenGL 3.3 core backend.
#[derive(Debug)]
pub struct OpenGlBackend {
    texture_formats: HashMap<u32, TextureFormat>,
}

impl OpenGlBackend {
    /// Create the backend for the context that is current on this thread.
    ///
    /// Fails if `gl::load_with` has not been called or no context is current.
    pub fn new() -> BackendResult<Self> {
        if !gl::GetString::is_loaded() {
            return Err(BackendError::ApiError(
                "GL function pointers are not loaded".to_string(),
            ));
        }

        let version = unsafe { gl::GetString(gl::VERSION) };
        if version.is_null() {
            return Err(BackendError::ApiError("no current GL context".to_string()));
        }
        let version = unsafe { CStr::from_ptr(version as *const c_char) };
        log::info!("OpenGlBackend: context {}", version.to_string_lossy());

        Ok(Self {
            texture_formats: HashMap::new(),
        })
    }

    /// Fetch and clear the GL error flag.
    fn check_error(what: &str) -> BackendResult<()> {
        let error = unsafe { gl::GetError() };
        match error {
            gl::NO_ERROR => Ok(()),
            gl::OUT_OF_MEMORY => Err(BackendError::OutOfMemory),
            code => Err(BackendError::ApiError(format!("{what}: GL error 0x{code:04X}"))),
        }
    }

    fn name_of(handle: u64) -> u32 {
        handle as u32
    }
}

fn gl_topology(topology: PrimitiveTopology) -> gl::types::GLenum {
    match topology {
        PrimitiveTopology::Points => gl::POINTS,
        PrimitiveTopology::Lines => gl::LINES,
        PrimitiveTopology::LineStrip => gl::LINE_STRIP,
        PrimitiveTopology::Triangles => gl::TRIANGLES,
        PrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
    }
}

fn gl_index_type(format: IndexFormat) -> gl::types::GLenum {
    match format {
        IndexFormat::Uint8 => gl::UNSIGNED_BYTE,
        IndexFormat::Uint16 => gl::UNSIGNED_SHORT,
        IndexFormat::Uint32 => gl::UNSIGNED_INT,
    }
}

fn gl_component_type(ty: ComponentType) -> gl::types::GLenum {
    match ty {
        ComponentType::Float => gl::FLOAT,
        ComponentType::Half => gl::HALF_FLOAT,
        ComponentType::Int => gl::INT,
        ComponentType::UInt => gl::UNSIGNED_INT,
        ComponentType::Short => gl::SHORT,
        ComponentType::UShort => gl::UNSIGNED_SHORT,
        ComponentType::Byte => gl::BYTE,
        ComponentType::UByte => gl::UNSIGNED_BYTE,
    }
}

fn gl_texture_format(format: TextureFormat) -> (gl::types::GLint, gl::types::GLenum) {
    match format {
        TextureFormat::R8 => (gl::R8 as i32, gl::RED),
        TextureFormat::Rg8 => (gl::RG8 as i32, gl::RG),
        TextureFormat::Rgb8 => (gl::RGB8 as i32, gl::RGB),
        TextureFormat::Rgba8 => (gl::RGBA8 as i32, gl::RGBA),
    }
}

impl GraphicsBackend for OpenGlBackend {
    fn name(&self) -> &'static str {
        "OpenGL Backend"
    }

    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle> {
        let mut id: u32 = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut id);
        }
        if id == 0 {
            return Err(BackendError::VertexArrayCreationFailed(
                "glGenVertexArrays returned 0".to_string(),
            ));
        }
        if let Err(err) = Self::check_error("glGenVertexArrays") {
            unsafe { gl::DeleteVertexArrays(1, &id) };
            return Err(err);
        }
        log::trace!("OpenGlBackend: created vertex array {}", id);
        Ok(VertexArrayHandle(id as u64))
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        let mut id: u32 = 0;
        unsafe {
            gl::GenBuffers(1, &mut id);
        }
        if id == 0 {
            return Err(BackendError::BufferCreationFailed(format!(
                "glGenBuffers returned 0 for {:?}",
                desc.label
            )));
        }

        // Element array bindings are VAO state; index data is uploaded
        // through ARRAY_BUFFER so no vertex array is disturbed.
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, id);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                data.len() as gl::types::GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        }

        if let Err(err) = Self::check_error("glBufferData") {
            unsafe { gl::DeleteBuffers(1, &id) };
            return Err(match err {
                BackendError::ApiError(msg) => BackendError::BufferUploadFailed(msg),
                other => other,
            });
        }

        log::trace!(
            "OpenGlBackend: created buffer {} {:?} (size: {})",
            id,
            desc.label,
            desc.size
        );
        Ok(BufferHandle(id as u64))
    }

    fn configure_vertex_array(
        &mut self,
        vertex_array: VertexArrayHandle,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        format: &VertexFormat,
    ) -> BackendResult<()> {
        unsafe {
            gl::BindVertexArray(Self::name_of(vertex_array.0));
            gl::BindBuffer(gl::ARRAY_BUFFER, Self::name_of(vertex_buffer.0));
            if let Some(index_buffer) = index_buffer {
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, Self::name_of(index_buffer.0));
            }

            for attrib in format.attributes() {
                gl::EnableVertexAttribArray(attrib.semantic);
                gl::VertexAttribPointer(
                    attrib.semantic,
                    attrib.components as gl::types::GLint,
                    gl_component_type(attrib.component_type),
                    gl::FALSE,
                    attrib.stride as gl::types::GLsizei,
                    attrib.offset as usize as *const c_void,
                );
            }

            gl::BindVertexArray(0);
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            if index_buffer.is_some() {
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, 0);
            }
        }

        Self::check_error("glVertexAttribPointer")
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        let mut id: u32 = 0;
        unsafe {
            gl::GenTextures(1, &mut id);
        }
        if id == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "glGenTextures returned 0 for {:?}",
                desc.label
            )));
        }

        let max_level = desc.mip_levels.saturating_sub(1) as i32;
        let min_filter = if desc.mip_levels > 1 {
            gl::LINEAR_MIPMAP_LINEAR
        } else {
            gl::LINEAR
        };
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, id);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_BASE_LEVEL, 0);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, max_level);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min_filter as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as i32);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }

        if let Err(err) = Self::check_error("glTexParameteri") {
            unsafe { gl::DeleteTextures(1, &id) };
            return Err(err);
        }

        self.texture_formats.insert(id, desc.format);
        log::trace!(
            "OpenGlBackend: created texture {} {:?} ({}x{}, {} levels)",
            id,
            desc.label,
            desc.width,
            desc.height,
            desc.mip_levels
        );
        Ok(TextureHandle(id as u64))
    }

    fn write_texture(
        &mut self,
        texture: TextureHandle,
        level: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> BackendResult<()> {
        let format = *self
            .texture_formats
            .get(&Self::name_of(texture.0))
            .ok_or_else(|| BackendError::InvalidHandle(format!("texture {}", texture.0)))?;
        let row_bytes = width as usize * format.bytes_per_pixel() as usize;
        if data.len() != row_bytes * height as usize {
            return Err(BackendError::TextureUploadFailed(format!(
                "level {} expects {} bytes, got {}",
                level,
                row_bytes * height as usize,
                data.len()
            )));
        }
        let (internal_format, pixel_format) = gl_texture_format(format);
        let alignment = row_alignment(row_bytes);

        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, Self::name_of(texture.0));
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, alignment as i32);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                level as i32,
                internal_format,
                width as i32,
                height as i32,
                0,
                pixel_format,
                gl::UNSIGNED_BYTE,
                data.as_ptr() as *const c_void,
            );
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 4);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }

        Self::check_error("glTexImage2D").map_err(|err| match err {
            BackendError::ApiError(msg) => BackendError::TextureUploadFailed(msg),
            other => other,
        })
    }

    fn draw(&mut self, vertex_array: VertexArrayHandle, topology: PrimitiveTopology, vertex_count: u32) {
        unsafe {
            gl::BindVertexArray(Self::name_of(vertex_array.0));
            gl::DrawArrays(gl_topology(topology), 0, vertex_count as gl::types::GLsizei);
            gl::BindVertexArray(0);
        }
    }

    fn draw_indexed(
        &mut self,
        vertex_array: VertexArrayHandle,
        topology: PrimitiveTopology,
        index_count: u32,
        format: IndexFormat,
    ) {
        unsafe {
            gl::BindVertexArray(Self::name_of(vertex_array.0));
            gl::DrawElements(
                gl_topology(topology),
                index_count as gl::types::GLsizei,
                gl_index_type(format),
                std::ptr::null(),
            );
            gl::BindVertexArray(0);
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        let id = Self::name_of(buffer.0);
        unsafe { gl::DeleteBuffers(1, &id) };
        log::trace!("OpenGlBackend: destroyed buffer {}", id);
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        let id = Self::name_of(vertex_array.0);
        unsafe { gl::DeleteVertexArrays(1, &id) };
        log::trace!("OpenGlBackend: destroyed vertex array {}", id);
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        let id = Self::name_of(texture.0);
        self.texture_formats.remove(&id);
        unsafe { gl::DeleteTextures(1, &id) };
        log::trace!("OpenGlBackend: destroyed texture {}", id);
    }
}
