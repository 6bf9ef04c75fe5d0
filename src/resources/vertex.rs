//! Vertex attribute and vertex format definitions.
//!
//! A [`VertexFormat`] is an ordered list of [`VertexAttrib`]s describing one
//! interleaved vertex record. The five built-in presets match the vertex
//! record types in this module field for field:
//!
//! | Preset                                  | Record                        | Size |
//! |-----------------------------------------|-------------------------------|------|
//! | [`VertexFormat::position`]              | [`VertexPosition`]            | 12   |
//! | [`VertexFormat::position_color`]        | [`VertexPositionColor`]       | 28   |
//! | [`VertexFormat::position_texture`]      | [`VertexPositionTexture`]     | 20   |
//! | [`VertexFormat::position_normal`]       | [`VertexPositionNormal`]      | 24   |
//! | [`VertexFormat::position_normal_texture`] | [`VertexPositionNormalTexture`] | 32 |

use std::mem::{offset_of, size_of};
use std::sync::OnceLock;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Semantic meaning of a vertex attribute.
///
/// The index doubles as the shader attribute location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Color,
    Normal,
    TexCoord,
}

impl VertexSemantic {
    pub fn index(&self) -> u32 {
        match self {
            Self::Position => 0,
            Self::Color => 1,
            Self::Normal => 2,
            Self::TexCoord => 3,
        }
    }
}

/// Scalar type of each component of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Float,
    Half,
    Int,
    UInt,
    Short,
    UShort,
    Byte,
    UByte,
}

impl ComponentType {
    /// Size of one component in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Float | Self::Int | Self::UInt => 4,
            Self::Half | Self::Short | Self::UShort => 2,
            Self::Byte | Self::UByte => 1,
        }
    }
}

/// A single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttrib {
    /// Attribute location, see [`VertexSemantic::index`].
    pub semantic: u32,
    /// Number of components (1-4).
    pub components: u32,
    pub component_type: ComponentType,
    /// Distance in bytes between consecutive records.
    pub stride: u32,
    /// Byte offset of the attribute within a record.
    pub offset: u32,
}

impl VertexAttrib {
    pub fn new(
        semantic: u32,
        components: u32,
        component_type: ComponentType,
        stride: u32,
        offset: u32,
    ) -> Self {
        Self {
            semantic,
            components,
            component_type,
            stride,
            offset,
        }
    }

    /// Float attribute for a well-known semantic.
    pub fn float(semantic: VertexSemantic, components: u32, stride: usize, offset: usize) -> Self {
        Self::new(
            semantic.index(),
            components,
            ComponentType::Float,
            stride as u32,
            offset as u32,
        )
    }

    /// Size of the attribute in bytes.
    pub fn size(&self) -> usize {
        self.components as usize * self.component_type.size()
    }
}

/// Memory layout of one vertex record.
///
/// Attribute order is significant: it is the order attributes are bound in.
/// [`VertexFormat::size`] is the sum of the attribute sizes and only equals
/// the record stride for tightly packed layouts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    attributes: Vec<VertexAttrib>,
    size: usize,
}

impl VertexFormat {
    /// Create an empty vertex format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn push(&mut self, attrib: VertexAttrib) {
        self.size += attrib.size();
        self.attributes.push(attrib);
    }

    /// Append an attribute, builder style.
    pub fn with_attrib(mut self, attrib: VertexAttrib) -> Self {
        self.push(attrib);
        self
    }

    pub fn attributes(&self) -> &[VertexAttrib] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Total record size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the attribute bound at a semantic index.
    pub fn get(&self, semantic: VertexSemantic) -> Option<&VertexAttrib> {
        let index = semantic.index();
        self.attributes.iter().find(|attrib| attrib.semantic == index)
    }

    pub fn has(&self, semantic: VertexSemantic) -> bool {
        self.get(semantic).is_some()
    }
}

// ============================================================================
// Built-in Formats
// ============================================================================

impl VertexFormat {
    /// Position-only format.
    pub fn position() -> &'static VertexFormat {
        static FORMAT: OnceLock<VertexFormat> = OnceLock::new();
        FORMAT.get_or_init(|| {
            let stride = size_of::<VertexPosition>();
            VertexFormat::new().with_attrib(VertexAttrib::float(
                VertexSemantic::Position,
                3,
                stride,
                offset_of!(VertexPosition, position),
            ))
        })
    }

    /// Position + color format.
    pub fn position_color() -> &'static VertexFormat {
        static FORMAT: OnceLock<VertexFormat> = OnceLock::new();
        FORMAT.get_or_init(|| {
            let stride = size_of::<VertexPositionColor>();
            VertexFormat::new()
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::Position,
                    3,
                    stride,
                    offset_of!(VertexPositionColor, position),
                ))
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::Color,
                    4,
                    stride,
                    offset_of!(VertexPositionColor, color),
                ))
        })
    }

    /// Position + texture coordinate format.
    pub fn position_texture() -> &'static VertexFormat {
        static FORMAT: OnceLock<VertexFormat> = OnceLock::new();
        FORMAT.get_or_init(|| {
            let stride = size_of::<VertexPositionTexture>();
            VertexFormat::new()
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::Position,
                    3,
                    stride,
                    offset_of!(VertexPositionTexture, position),
                ))
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::TexCoord,
                    2,
                    stride,
                    offset_of!(VertexPositionTexture, texcoord),
                ))
        })
    }

    /// Position + normal format.
    pub fn position_normal() -> &'static VertexFormat {
        static FORMAT: OnceLock<VertexFormat> = OnceLock::new();
        FORMAT.get_or_init(|| {
            let stride = size_of::<VertexPositionNormal>();
            VertexFormat::new()
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::Position,
                    3,
                    stride,
                    offset_of!(VertexPositionNormal, position),
                ))
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::Normal,
                    3,
                    stride,
                    offset_of!(VertexPositionNormal, normal),
                ))
        })
    }

    /// Position + normal + texture coordinate format (32 bytes per vertex).
    pub fn position_normal_texture() -> &'static VertexFormat {
        static FORMAT: OnceLock<VertexFormat> = OnceLock::new();
        FORMAT.get_or_init(|| {
            let stride = size_of::<VertexPositionNormalTexture>();
            VertexFormat::new()
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::Position,
                    3,
                    stride,
                    offset_of!(VertexPositionNormalTexture, position),
                ))
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::Normal,
                    3,
                    stride,
                    offset_of!(VertexPositionNormalTexture, normal),
                ))
                .with_attrib(VertexAttrib::float(
                    VertexSemantic::TexCoord,
                    2,
                    stride,
                    offset_of!(VertexPositionNormalTexture, texcoord),
                ))
        })
    }
}

// ============================================================================
// Vertex Records
// ============================================================================

/// A vertex record type with a matching built-in format.
pub trait Vertex: Pod {
    fn format() -> &'static VertexFormat;
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct VertexPosition {
    pub position: Vec3,
}

impl VertexPosition {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }
}

impl Vertex for VertexPosition {
    fn format() -> &'static VertexFormat {
        VertexFormat::position()
    }
}

/// Position with an RGBA color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct VertexPositionColor {
    pub position: Vec3,
    pub color: [f32; 4],
}

impl VertexPositionColor {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

impl Vertex for VertexPositionColor {
    fn format() -> &'static VertexFormat {
        VertexFormat::position_color()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct VertexPositionTexture {
    pub position: Vec3,
    pub texcoord: Vec2,
}

impl VertexPositionTexture {
    pub fn new(position: Vec3, texcoord: Vec2) -> Self {
        Self { position, texcoord }
    }
}

impl Vertex for VertexPositionTexture {
    fn format() -> &'static VertexFormat {
        VertexFormat::position_texture()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct VertexPositionNormal {
    pub position: Vec3,
    pub normal: Vec3,
}

impl VertexPositionNormal {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

impl Vertex for VertexPositionNormal {
    fn format() -> &'static VertexFormat {
        VertexFormat::position_normal()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct VertexPositionNormalTexture {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
}

impl VertexPositionNormalTexture {
    pub fn new(position: Vec3, normal: Vec3, texcoord: Vec2) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}

impl Vertex for VertexPositionNormalTexture {
    fn format() -> &'static VertexFormat {
        VertexFormat::position_normal_texture()
    }
}

static_assertions::assert_eq_size!(VertexPosition, [f32; 3]);
static_assertions::assert_eq_size!(VertexPositionColor, [f32; 7]);
static_assertions::assert_eq_size!(VertexPositionTexture, [f32; 5]);
static_assertions::assert_eq_size!(VertexPositionNormal, [f32; 6]);
static_assertions::assert_eq_size!(VertexPositionNormalTexture, [f32; 8]);
