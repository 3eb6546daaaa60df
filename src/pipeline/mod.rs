//! Pipeline resolution and execution
//!
//! The build phase resolves a requested set of operations plus their
//! transitive dependencies into an ordered, deduplicated list bound to the
//! current vertex source; the execute phase replays that list once per
//! vertex with no allocation and no further decisions.

mod executor;
mod operation;
mod resolver;

pub use executor::Pipeline;
pub use operation::{LoadContext, OpCache, VertexAttribute, VertexOperation};
pub(crate) use resolver::{build_explicit, Resolver};

use thiserror::Error;

use crate::registry::OperationId;

/// Pipeline construction and execution errors.
///
/// Build errors are deterministic for a given source and requested set; the
/// engine never retries them, and a failed build leaves the previously
/// committed pipeline untouched.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An operation can neither obtain nor derive a value it requires from
    /// the bound source.
    #[error("illegal pipeline configuration: {reason}")]
    IllegalConfiguration { reason: String },

    /// Declared dependencies form a cycle.
    #[error("cyclic dependency between vertex operations at '{operation}'")]
    CyclicDependency { operation: String },

    /// A hard requirement has no satisfying operation in the resolved set.
    #[error("requirement on operation kind {required:?} is not satisfied by any resolved operation")]
    UnsatisfiedRequirement { required: OperationId },

    /// A vertex range was run with no source bound.
    #[error("no vertex source is bound")]
    NoSource,
}

pub type PipelineResult<T> = Result<T, PipelineError>;
