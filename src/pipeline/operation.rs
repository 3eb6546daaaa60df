//! Vertex operation traits and the load-time context

use std::any::Any;
use std::sync::Arc;

use crate::registry::{AttributeIndex, OperationId, Registry};
use crate::source::VertexSource;
use crate::state::VertexContext;

use super::PipelineResult;

/// Type-erased cache captured by an operation's `load` and handed back to
/// every `operate` call of the same build.
pub type OpCache = Box<dyn Any + Send + Sync>;

/// An operation run for each vertex, mutating the shared [`VertexContext`].
///
/// `load` runs once per pipeline build, never per vertex: attribute-presence
/// checks, source lookups and derivation decisions all happen there, outside
/// the hot loop. Whatever `operate` needs later is stored into the build's
/// resolution record with [`LoadContext::set_cache`], keyed by the
/// operation's identity — operation objects themselves stay immutable and
/// shareable.
pub trait VertexOperation: Send + Sync {
    /// Name for diagnostics and error messages.
    fn name(&self) -> &str;

    /// The registered identity of this operation kind.
    fn operation_id(&self) -> OperationId;

    /// Decide whether this operation must run for the bound source.
    ///
    /// Returning `Ok(false)` excludes the operation from the pipeline for as
    /// long as the current source stays bound (the value is provided
    /// elsewhere, or cannot apply). Dependencies on other attribute kinds
    /// and hard requirements are declared on `ctx`.
    fn load(&self, ctx: &mut LoadContext<'_>) -> PipelineResult<bool>;

    /// Run the computation for the current vertex, reading only the cache
    /// captured during `load`.
    fn operate(&self, ctx: &mut VertexContext, cache: Option<&(dyn Any + Send + Sync)>);
}

/// An operation kind that also manages a named, typed backing array for
/// bulk-supplied per-vertex data.
pub trait VertexAttribute: VertexOperation {
    /// Position in the registry's attribute table, used to address
    /// per-model attribute arrays.
    fn attribute_index(&self) -> AttributeIndex;

    /// Construct backing storage for `len` vertices of this attribute's
    /// array type.
    fn new_array(&self, len: usize) -> Arc<dyn Any + Send + Sync>;
}

/// Context handed to [`VertexOperation::load`] during one pipeline build.
pub struct LoadContext<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) source: Option<&'a dyn VertexSource>,
    pub(crate) context: &'a VertexContext,
    pub(crate) dependencies: Vec<AttributeIndex>,
    pub(crate) requirements: Vec<OperationId>,
    pub(crate) cache: Option<OpCache>,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(
        registry: &'a Registry,
        source: Option<&'a dyn VertexSource>,
        context: &'a VertexContext,
    ) -> Self {
        Self {
            registry,
            source,
            context,
            dependencies: Vec::new(),
            requirements: Vec::new(),
            cache: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Read-only view of the render state's context flags.
    pub fn context(&self) -> &VertexContext {
        self.context
    }

    /// Whether the bound source provides the attribute at all, as an array
    /// or via its per-vertex callback.
    pub fn has_attribute(&self, index: AttributeIndex) -> bool {
        self.source.is_some_and(|s| s.has_attribute(index))
    }

    /// The source's precomputed array for an attribute, shared with the
    /// build. `None` when the source has no array for it.
    pub fn attribute_array<T: Send + Sync + 'static>(
        &self,
        index: AttributeIndex,
    ) -> Option<Arc<Vec<T>>> {
        let any = self.source?.attribute(index)?;
        any.downcast::<Vec<T>>().ok()
    }

    /// Declare that this operation must run after the given attribute kind.
    pub fn add_dependency(&mut self, index: AttributeIndex) {
        self.dependencies.push(index);
    }

    /// Declare a hard requirement: some operation of this kind must be in
    /// the final pipeline, though not necessarily before this one.
    pub fn add_requirement(&mut self, id: OperationId) {
        self.requirements.push(id);
    }

    /// Store the cache `operate` will read for the rest of this build.
    pub fn set_cache<C: Any + Send + Sync>(&mut self, cache: C) {
        self.cache = Some(Box::new(cache));
    }
}
