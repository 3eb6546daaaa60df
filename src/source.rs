//! The vertex source contract
//!
//! A source exposes one renderable unit: its raw vertices and, per attribute
//! kind, either a precomputed backing array or a per-vertex push path. The
//! engine only ever reads from a source.

use std::any::Any;
use std::sync::Arc;

use crate::backend::Vertex;
use crate::registry::AttributeIndex;
use crate::state::VertexContext;

pub trait VertexSource: Send + Sync {
    /// The backing vertex array: position and texture coordinates per vertex.
    fn vertices(&self) -> &[Vertex];

    /// The precomputed backing array for an attribute, or `None` if the
    /// source has not computed one. Arrays are shared, not copied; consumers
    /// downcast them via [`LoadContext::attribute_array`].
    ///
    /// [`LoadContext::attribute_array`]: crate::pipeline::LoadContext::attribute_array
    fn attribute(&self, index: AttributeIndex) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Whether this source provides the attribute at all — either as an
    /// array from [`attribute`](Self::attribute) or by pushing values from
    /// [`prepare_vertex`](Self::prepare_vertex). `true` with no array means
    /// the value arrives per vertex.
    fn has_attribute(&self, index: AttributeIndex) -> bool;

    /// Called before each vertex is processed, letting the source push
    /// values for attributes it computes lazily rather than as arrays.
    fn prepare_vertex(&self, _context: &mut VertexContext) {}
}
