//! Matrix transform operation
//!
//! All transforms share one registered operation kind, so attributes can
//! require that "a transform has run" without caring which instance did.

use std::any::Any;

use glam::{Mat3, Mat4};

use crate::pipeline::{LoadContext, PipelineResult, VertexOperation};
use crate::registry::{OperationId, Registry};
use crate::state::VertexContext;

pub struct MatrixTransform {
    operation: OperationId,
    matrix: Mat4,
    normal_matrix: Mat3,
}

impl MatrixTransform {
    pub fn new(registry: &Registry, matrix: Mat4) -> Self {
        Self {
            operation: registry.standard().transform,
            matrix,
            normal_matrix: Mat3::from_mat4(matrix).inverse().transpose(),
        }
    }
}

impl VertexOperation for MatrixTransform {
    fn name(&self) -> &str {
        "transform"
    }

    fn operation_id(&self) -> OperationId {
        self.operation
    }

    fn load(&self, _ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        Ok(true)
    }

    fn operate(&self, ctx: &mut VertexContext, _cache: Option<&(dyn Any + Send + Sync)>) {
        ctx.vert.position = self.matrix.transform_point3(ctx.vert.position);
        if ctx.has_normal {
            ctx.normal = (self.normal_matrix * ctx.normal).normalize_or_zero();
        }
    }
}
