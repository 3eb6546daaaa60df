//! Committed pipeline storage and per-vertex execution

use std::sync::Arc;

use crate::registry::OperationId;
use crate::state::VertexContext;

use super::operation::{OpCache, VertexOperation};

/// The resolved, ordered, duplicate-free operation list for the currently
/// bound source, together with the per-build caches keyed by operation id.
///
/// Rebuilt only when the bound source changes identity; stable across any
/// number of `run` calls in between.
#[derive(Default)]
pub struct Pipeline {
    ops: Vec<Arc<dyn VertexOperation>>,
    caches: Vec<Option<OpCache>>,
}

impl Pipeline {
    pub(crate) fn from_parts(ops: Vec<Arc<dyn VertexOperation>>, caches: Vec<Option<OpCache>>) -> Self {
        Self { ops, caches }
    }

    /// The active operations in execution order.
    pub fn operations(&self) -> &[Arc<dyn VertexOperation>] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Position of an operation kind in the resolved order, if active.
    pub fn position_of(&self, id: OperationId) -> Option<usize> {
        self.ops.iter().position(|op| op.operation_id() == id)
    }

    /// Drop the resolved list; the pipeline object itself is reused.
    pub(crate) fn clear(&mut self) {
        self.ops.clear();
        self.caches.clear();
    }

    /// Execute every active operation in resolved order for the current
    /// vertex. Allocation-free: all decisions were frozen at build time and
    /// no `load` calls happen here.
    pub(crate) fn operate(&self, ctx: &mut VertexContext) {
        for op in &self.ops {
            let cache = self.caches[op.operation_id().index()].as_deref();
            op.operate(ctx, cache);
        }
    }
}
