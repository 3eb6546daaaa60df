//! Side attribute: supplied directly or derived from the computed normal
//!
//! Forms a mutual-fallback pair with the normal attribute; exactly one
//! derivation direction is taken depending on which attribute the source
//! actually supplies.

use std::any::Any;
use std::sync::Arc;

use crate::lighting::find_side;
use crate::pipeline::{LoadContext, PipelineResult, VertexAttribute, VertexOperation};
use crate::registry::{AttributeIndex, OperationId};
use crate::state::VertexContext;

pub struct SideAttribute {
    index: AttributeIndex,
    operation: OperationId,
    normal: AttributeIndex,
}

impl SideAttribute {
    pub(crate) fn new(index: AttributeIndex, operation: OperationId, normal: AttributeIndex) -> Self {
        Self {
            index,
            operation,
            normal,
        }
    }
}

impl VertexOperation for SideAttribute {
    fn name(&self) -> &str {
        "side"
    }

    fn operation_id(&self) -> OperationId {
        self.operation
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if ctx.has_attribute(self.index) {
            return Ok(match ctx.attribute_array::<u8>(self.index) {
                Some(sides) => {
                    ctx.set_cache(sides);
                    true
                }
                None => false,
            });
        }
        // If the normal is underivable too, resolving it reports the error.
        ctx.add_dependency(self.normal);
        Ok(true)
    }

    fn operate(&self, ctx: &mut VertexContext, cache: Option<&(dyn Any + Send + Sync)>) {
        match cache.and_then(|c| c.downcast_ref::<Arc<Vec<u8>>>()) {
            Some(sides) => ctx.side = sides[ctx.vertex_index],
            None => ctx.side = find_side(ctx.normal),
        }
    }
}

impl VertexAttribute for SideAttribute {
    fn attribute_index(&self) -> AttributeIndex {
        self.index
    }

    fn new_array(&self, len: usize) -> Arc<dyn Any + Send + Sync> {
        Arc::new(vec![0u8; len])
    }
}
