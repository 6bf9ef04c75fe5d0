//! Procedural meshes
//!
//! Unit-sized shapes centered at the origin, baked through a transform and
//! uploaded with the mesh builder.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::backend::{GraphicsBackend, PrimitiveTopology};

use super::mesh::{create_indexed_mesh, create_mesh, Mesh, MeshError};
use super::vertex::{
    VertexPosition, VertexPositionColor, VertexPositionNormal, VertexPositionNormalTexture,
};

const BOX_CORNERS: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

#[rustfmt::skip]
const BOX_EDGES: [u8; 24] = [
    0, 1, 1, 2, 2, 3, 3, 0, // back
    4, 5, 5, 6, 6, 7, 7, 4, // front
    0, 4, 1, 5, 2, 6, 3, 7, // sides
];

/// Box faces as (normal, four corners counter-clockwise seen from outside).
const BOX_FACES: [(Vec3, [usize; 4]); 6] = [
    (Vec3::Z, [4, 5, 6, 7]),
    (Vec3::NEG_Z, [1, 0, 3, 2]),
    (Vec3::X, [5, 1, 2, 6]),
    (Vec3::NEG_X, [0, 4, 7, 3]),
    (Vec3::Y, [7, 6, 2, 3]),
    (Vec3::NEG_Y, [0, 1, 5, 4]),
];

fn normal_matrix(transform: &Mat4) -> Mat3 {
    Mat3::from_mat4(*transform).inverse().transpose()
}

/// 12 edges of a unit box as a line list with `u8` indices.
pub fn wireframe_box<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    transform: &Mat4,
) -> Result<Mesh, MeshError> {
    let vertices: Vec<_> = BOX_CORNERS
        .iter()
        .map(|corner| VertexPosition::new(transform.transform_point3(*corner)))
        .collect();
    create_indexed_mesh(backend, PrimitiveTopology::Lines, &vertices, &BOX_EDGES)
}

/// Unit box as 12 flat-shaded triangles.
pub fn solid_box<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    transform: &Mat4,
) -> Result<Mesh, MeshError> {
    let normals = normal_matrix(transform);
    let mut vertices = Vec::with_capacity(36);

    for (normal, corners) in BOX_FACES {
        let normal = (normals * normal).normalize_or_zero();
        for i in [0, 1, 2, 0, 2, 3] {
            let position = transform.transform_point3(BOX_CORNERS[corners[i]]);
            vertices.push(VertexPositionNormal::new(position, normal));
        }
    }

    create_mesh(backend, PrimitiveTopology::Triangles, &vertices)
}

/// Unit quad in the XY plane facing +Z, with texture coordinates.
pub fn textured_quad<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    transform: &Mat4,
) -> Result<Mesh, MeshError> {
    let normal = (normal_matrix(transform) * Vec3::Z).normalize_or_zero();
    let corners = [
        (Vec3::new(-0.5, -0.5, 0.0), Vec2::new(0.0, 1.0)),
        (Vec3::new(0.5, -0.5, 0.0), Vec2::new(1.0, 1.0)),
        (Vec3::new(0.5, 0.5, 0.0), Vec2::new(1.0, 0.0)),
        (Vec3::new(-0.5, 0.5, 0.0), Vec2::new(0.0, 0.0)),
    ];
    let vertices: Vec<_> = corners
        .iter()
        .map(|(position, uv)| {
            VertexPositionNormalTexture::new(transform.transform_point3(*position), normal, *uv)
        })
        .collect();
    let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];

    create_indexed_mesh(backend, PrimitiveTopology::Triangles, &vertices, &indices)
}

/// X, Y and Z axes as red, green and blue unit lines.
pub fn axes<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    transform: &Mat4,
) -> Result<Mesh, MeshError> {
    let origin = transform.transform_point3(Vec3::ZERO);
    let axes = [
        (Vec3::X, [1.0, 0.0, 0.0, 1.0]),
        (Vec3::Y, [0.0, 1.0, 0.0, 1.0]),
        (Vec3::Z, [0.0, 0.0, 1.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(6);
    for (axis, color) in axes {
        vertices.push(VertexPositionColor::new(origin, color));
        vertices.push(VertexPositionColor::new(transform.transform_point3(axis), color));
    }

    create_mesh(backend, PrimitiveTopology::Lines, &vertices)
}
