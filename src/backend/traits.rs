//! The graphics emission boundary
//!
//! The engine drives a backend only through this narrow contract: begin a
//! primitive batch, emit finished vertices, end the batch. How vertices are
//! buffered and submitted is entirely the backend's business.

use crate::backend::types::*;

/// Consumer of finished vertices.
pub trait VertexEmitter {
    /// Begin a primitive batch.
    fn begin(&mut self, mode: PrimitiveMode);

    /// Emit one finished vertex. Optional fields carry only values the
    /// pipeline set for this vertex.
    fn emit_vertex(&mut self, vertex: &EmittedVertex);

    /// Finish the batch and submit it.
    fn end(&mut self);

    /// Texture binding passthrough, unrelated to the pipeline.
    fn bind_texture(&mut self, _identifier: &str) {}
}
