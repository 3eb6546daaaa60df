//! Light-coupling attribute: provided directly or derived from position
//!
//! The derived path reads the vertex position relative to the bound light
//! transform's origin and the vertex side, and therefore requires that a
//! coordinate transform has already run — expressed as a hard requirement
//! rather than a dependency edge, since any transform instance satisfies it.

use std::any::Any;
use std::sync::Arc;

use glam::Vec3;

use crate::lighting::LightCoord;
use crate::pipeline::{LoadContext, PipelineResult, VertexAttribute, VertexOperation};
use crate::registry::{AttributeIndex, OperationId};
use crate::state::VertexContext;

pub struct LightCoordAttribute {
    index: AttributeIndex,
    operation: OperationId,
    side: AttributeIndex,
    transform: OperationId,
}

enum Cache {
    Provided(Arc<Vec<LightCoord>>),
    /// Origin captured from the bound light transform at load time.
    Derived { origin: Vec3 },
}

impl LightCoordAttribute {
    pub(crate) fn new(
        index: AttributeIndex,
        operation: OperationId,
        side: AttributeIndex,
        transform: OperationId,
    ) -> Self {
        Self {
            index,
            operation,
            side,
            transform,
        }
    }
}

impl VertexOperation for LightCoordAttribute {
    fn name(&self) -> &str {
        "light_coord"
    }

    fn operation_id(&self) -> OperationId {
        self.operation
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if ctx.has_attribute(self.index) {
            return Ok(match ctx.attribute_array::<LightCoord>(self.index) {
                Some(coords) => {
                    ctx.set_cache(Cache::Provided(coords));
                    true
                }
                None => false,
            });
        }
        let origin = ctx.context().light.map(|l| l.origin).unwrap_or(Vec3::ZERO);
        ctx.add_dependency(self.side);
        ctx.add_requirement(self.transform);
        ctx.set_cache(Cache::Derived { origin });
        Ok(true)
    }

    fn operate(&self, ctx: &mut VertexContext, cache: Option<&(dyn Any + Send + Sync)>) {
        match cache.and_then(|c| c.downcast_ref::<Cache>()) {
            Some(Cache::Provided(coords)) => ctx.light_coord = coords[ctx.vertex_index],
            Some(Cache::Derived { origin }) => {
                ctx.light_coord = LightCoord::compute(ctx.vert.position - *origin, ctx.side);
            }
            None => {}
        }
    }
}

impl VertexAttribute for LightCoordAttribute {
    fn attribute_index(&self) -> AttributeIndex {
        self.index
    }

    fn new_array(&self, len: usize) -> Arc<dyn Any + Send + Sync> {
        Arc::new(vec![LightCoord::default(); len])
    }
}
