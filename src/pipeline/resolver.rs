//! Dependency resolution for pipeline builds

use std::sync::Arc;

use log::{debug, trace};

use crate::registry::{OperationId, Registry};
use crate::source::VertexSource;
use crate::state::VertexContext;

use super::executor::Pipeline;
use super::operation::{LoadContext, OpCache, VertexOperation};
use super::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unresolved,
    /// `load` ran; dependencies are still being expanded. Revisiting a kind
    /// in this state means the declared dependencies form a cycle.
    InProgress,
    Active,
    /// `load` returned false; excluded from this build and not retried.
    Inactive,
}

/// One pipeline build pass against the currently bound source.
///
/// The resolver owns every piece of intermediate state, so a failed build
/// constructs nothing visible: the previously committed pipeline is left
/// untouched and the error propagates to whoever triggered the rebind.
pub(crate) struct Resolver<'a> {
    registry: &'a Registry,
    source: &'a dyn VertexSource,
    context: &'a VertexContext,
    status: Vec<Status>,
    order: Vec<Arc<dyn VertexOperation>>,
    caches: Vec<Option<OpCache>>,
    requirements: Vec<OperationId>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registry: &'a Registry,
        source: &'a dyn VertexSource,
        context: &'a VertexContext,
    ) -> Self {
        let count = registry.operation_count();
        Self {
            registry,
            source,
            context,
            status: vec![Status::Unresolved; count],
            order: Vec::new(),
            caches: (0..count).map(|_| None).collect(),
            requirements: Vec::new(),
        }
    }

    /// Resolve the requested operations plus their transitive dependencies
    /// into an ordered, duplicate-free pipeline.
    pub fn resolve(mut self, requested: &[Arc<dyn VertexOperation>]) -> PipelineResult<Pipeline> {
        for op in requested {
            self.visit(op)?;
        }
        self.enforce_requirements()?;
        debug!("resolved pipeline: {} active operations", self.order.len());
        Ok(Pipeline::from_parts(self.order, self.caches))
    }

    /// Depth-first expansion of one operation kind. Dependencies declared
    /// during `load` are resolved recursively and land strictly before the
    /// dependent in the final order.
    fn visit(&mut self, op: &Arc<dyn VertexOperation>) -> PipelineResult<bool> {
        let id = op.operation_id();
        match self.status[id.index()] {
            Status::InProgress => {
                return Err(PipelineError::CyclicDependency {
                    operation: op.name().to_string(),
                })
            }
            Status::Active => return Ok(true),
            Status::Inactive => return Ok(false),
            Status::Unresolved => {}
        }
        self.status[id.index()] = Status::InProgress;

        let mut ctx = LoadContext::new(self.registry, Some(self.source), self.context);
        let active = op.load(&mut ctx)?;
        let LoadContext {
            dependencies,
            requirements,
            cache,
            ..
        } = ctx;

        if !active {
            trace!("'{}' is redundant for this source", op.name());
            self.status[id.index()] = Status::Inactive;
            return Ok(false);
        }

        for dep in dependencies {
            let dep_op = self.registry.attribute_operation(dep).clone();
            self.visit(&dep_op)?;
        }

        self.requirements.extend(requirements);
        self.caches[id.index()] = cache;
        self.order.push(op.clone());
        self.status[id.index()] = Status::Active;
        trace!("'{}' active at position {}", op.name(), self.order.len() - 1);
        Ok(true)
    }

    /// Every collected hard requirement must be satisfied by an active
    /// operation. A registry-registered instance of the required kind is
    /// pulled in on demand; kinds without one (or that decline to load)
    /// fail the build.
    fn enforce_requirements(&mut self) -> PipelineResult<()> {
        // Satisfying one requirement may declare further ones.
        let mut next = 0;
        while next < self.requirements.len() {
            let required = self.requirements[next];
            next += 1;
            if self.status[required.index()] == Status::Active {
                continue;
            }
            let satisfied = match self.registry.operation(required).cloned() {
                Some(op) => self.visit(&op)?,
                None => false,
            };
            if !satisfied {
                return Err(PipelineError::UnsatisfiedRequirement { required });
            }
        }
        Ok(())
    }
}

/// Build an explicit, caller-ordered pipeline.
///
/// `load` still runs once per operation to capture caches and drop
/// redundant entries, but declared dependencies and requirements are
/// discarded: the caller's ordering is trusted as-is.
pub(crate) fn build_explicit(
    registry: &Registry,
    source: Option<&dyn VertexSource>,
    context: &VertexContext,
    ops: &[Arc<dyn VertexOperation>],
) -> PipelineResult<Pipeline> {
    let mut order = Vec::with_capacity(ops.len());
    let mut caches: Vec<Option<OpCache>> = (0..registry.operation_count()).map(|_| None).collect();
    for op in ops {
        let mut ctx = LoadContext::new(registry, source, context);
        if op.load(&mut ctx)? {
            caches[op.operation_id().index()] = ctx.cache;
            order.push(op.clone());
        }
    }
    debug!("explicit pipeline: {} of {} operations kept", order.len(), ops.len());
    Ok(Pipeline::from_parts(order, caches))
}
