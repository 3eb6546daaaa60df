//! A baked model: vertices plus precomputed attribute arrays

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::Vertex;
use crate::pipeline::VertexAttribute;
use crate::registry::AttributeIndex;
use crate::source::VertexSource;
use crate::state::VertexContext;

/// Array-backed [`VertexSource`]. Attribute arrays are expected to cover the
/// vertex range the model is rendered with.
pub struct Model {
    vertices: Vec<Vertex>,
    attributes: HashMap<AttributeIndex, Arc<dyn Any + Send + Sync>>,
}

impl Model {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self {
            vertices,
            attributes: HashMap::new(),
        }
    }

    /// Attach a precomputed attribute array, builder-style.
    pub fn with_attribute<T: Send + Sync + 'static>(
        mut self,
        index: AttributeIndex,
        values: Vec<T>,
    ) -> Self {
        self.set_attribute(index, values);
        self
    }

    pub fn set_attribute<T: Send + Sync + 'static>(&mut self, index: AttributeIndex, values: Vec<T>) {
        self.attributes.insert(index, Arc::new(values));
    }

    /// Allocate default-initialized backing storage for an attribute using
    /// the kind's array factory, sized to this model's vertex count.
    pub fn allocate_attribute(&mut self, attribute: &dyn VertexAttribute) {
        self.attributes.insert(
            attribute.attribute_index(),
            attribute.new_array(self.vertices.len()),
        );
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl VertexSource for Model {
    fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn attribute(&self, index: AttributeIndex) -> Option<Arc<dyn Any + Send + Sync>> {
        self.attributes.get(&index).cloned()
    }

    fn has_attribute(&self, index: AttributeIndex) -> bool {
        self.attributes.contains_key(&index)
    }

    fn prepare_vertex(&self, _context: &mut VertexContext) {}
}
