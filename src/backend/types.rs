//! Common types shared with graphics backends

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// A raw vertex as stored by a vertex source: position plus texture
/// coordinates. Everything else (normal, color, brightness) is produced by
/// pipeline operations.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }
}

/// Primitive topology for a draw batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    Triangles,
    TriangleStrip,
    #[default]
    Quads,
}

/// A finished vertex handed to the backend.
///
/// Optional fields are `Some` only when an operation set them for this
/// vertex; the engine never forwards stale values from a previous vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmittedVertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Option<Vec3>,
    /// Packed `0xRRGGBBAA`, alpha override already applied.
    pub color: Option<u32>,
    pub brightness: Option<u32>,
}
