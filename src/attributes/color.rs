//! Color attribute: per-vertex colors modulated by the base color
//!
//! Never fails to load — a source without color data simply renders with
//! the render state's base color alone.

use std::any::Any;
use std::sync::Arc;

use crate::color;
use crate::pipeline::{LoadContext, PipelineResult, VertexAttribute, VertexOperation};
use crate::registry::{AttributeIndex, OperationId};
use crate::state::VertexContext;

pub struct ColorAttribute {
    index: AttributeIndex,
    operation: OperationId,
}

impl ColorAttribute {
    pub(crate) fn new(index: AttributeIndex, operation: OperationId) -> Self {
        Self { index, operation }
    }
}

impl VertexOperation for ColorAttribute {
    fn name(&self) -> &str {
        "color"
    }

    fn operation_id(&self) -> OperationId {
        self.operation
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        match ctx.attribute_array::<u32>(self.index) {
            Some(colors) => {
                ctx.set_cache(colors);
                Ok(true)
            }
            // Declared but array-less means the source pushes colors itself.
            None => Ok(!ctx.has_attribute(self.index)),
        }
    }

    fn operate(&self, ctx: &mut VertexContext, cache: Option<&(dyn Any + Send + Sync)>) {
        match cache.and_then(|c| c.downcast_ref::<Arc<Vec<u32>>>()) {
            Some(colors) => {
                let tinted = color::multiply(ctx.base_color, colors[ctx.vertex_index]);
                ctx.set_color(tinted);
            }
            None => ctx.set_color(ctx.base_color),
        }
    }
}

impl VertexAttribute for ColorAttribute {
    fn attribute_index(&self) -> AttributeIndex {
        self.index
    }

    fn new_array(&self, len: usize) -> Arc<dyn Any + Send + Sync> {
        Arc::new(vec![color::WHITE; len])
    }
}
