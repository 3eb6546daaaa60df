//! Normal attribute: supplied directly or derived from the side attribute

use std::any::Any;
use std::sync::Arc;

use glam::Vec3;

use crate::lighting::SIDE_AXES;
use crate::pipeline::{LoadContext, PipelineError, PipelineResult, VertexAttribute, VertexOperation};
use crate::registry::{AttributeIndex, OperationId};
use crate::state::VertexContext;

pub struct NormalAttribute {
    index: AttributeIndex,
    operation: OperationId,
    side: AttributeIndex,
}

impl NormalAttribute {
    pub(crate) fn new(index: AttributeIndex, operation: OperationId, side: AttributeIndex) -> Self {
        Self {
            index,
            operation,
            side,
        }
    }
}

impl VertexOperation for NormalAttribute {
    fn name(&self) -> &str {
        "normal"
    }

    fn operation_id(&self) -> OperationId {
        self.operation
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if ctx.has_attribute(self.index) {
            // Array-backed, or pushed per vertex by the source when it
            // declares the attribute without an array.
            return Ok(match ctx.attribute_array::<Vec3>(self.index) {
                Some(normals) => {
                    ctx.set_cache(normals);
                    true
                }
                None => false,
            });
        }
        if ctx.has_attribute(self.side) {
            ctx.add_dependency(self.side);
            return Ok(true);
        }
        Err(PipelineError::IllegalConfiguration {
            reason: "normals requested but the source provides neither normal nor side data".into(),
        })
    }

    fn operate(&self, ctx: &mut VertexContext, cache: Option<&(dyn Any + Send + Sync)>) {
        match cache.and_then(|c| c.downcast_ref::<Arc<Vec<Vec3>>>()) {
            Some(normals) => ctx.set_normal(normals[ctx.vertex_index]),
            None => ctx.set_normal(SIDE_AXES[ctx.side as usize]),
        }
    }
}

impl VertexAttribute for NormalAttribute {
    fn attribute_index(&self) -> AttributeIndex {
        self.index
    }

    fn new_array(&self, len: usize) -> Arc<dyn Any + Send + Sync> {
        Arc::new(vec![Vec3::ZERO; len])
    }
}
