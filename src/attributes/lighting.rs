//! Lighting color attribute: shades the color output per vertex
//!
//! Participates only when lighting and color are both enabled and the source
//! exposes precomputed lighting colors; depends on, and overrides the result
//! of, the color attribute.

use std::any::Any;
use std::sync::Arc;

use crate::color;
use crate::pipeline::{LoadContext, PipelineResult, VertexAttribute, VertexOperation};
use crate::registry::{AttributeIndex, OperationId};
use crate::state::VertexContext;

pub struct LightingAttribute {
    index: AttributeIndex,
    operation: OperationId,
    color: AttributeIndex,
}

impl LightingAttribute {
    pub(crate) fn new(index: AttributeIndex, operation: OperationId, color: AttributeIndex) -> Self {
        Self {
            index,
            operation,
            color,
        }
    }
}

impl VertexOperation for LightingAttribute {
    fn name(&self) -> &str {
        "lighting"
    }

    fn operation_id(&self) -> OperationId {
        self.operation
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        let flags = ctx.context();
        if !flags.compute_lighting || !flags.use_color || !ctx.has_attribute(self.index) {
            return Ok(false);
        }
        match ctx.attribute_array::<u32>(self.index) {
            Some(light) => {
                ctx.add_dependency(self.color);
                ctx.set_cache(light);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn operate(&self, ctx: &mut VertexContext, cache: Option<&(dyn Any + Send + Sync)>) {
        if let Some(light) = cache.and_then(|c| c.downcast_ref::<Arc<Vec<u32>>>()) {
            let shaded = color::multiply(ctx.color, light[ctx.vertex_index]);
            ctx.set_color(shaded);
        }
    }
}

impl VertexAttribute for LightingAttribute {
    fn attribute_index(&self) -> AttributeIndex {
        self.index
    }

    fn new_array(&self, len: usize) -> Arc<dyn Any + Send + Sync> {
        Arc::new(vec![color::WHITE; len])
    }
}
