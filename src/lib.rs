//! A dependency-resolving per-vertex operation pipeline
//!
//! Renderers need an open set of optional per-vertex computations — normals,
//! colors, lighting terms, light-coupling coordinates — that may be supplied
//! directly by a vertex source, derived from other attributes, or skipped
//! entirely. This crate decides once per source binding which operations
//! actually run and in what order, then replays that resolved pipeline for
//! every vertex in range with no per-vertex heap allocation.
//!
//! # Architecture
//! - [`registry`]: stable identities for operation and attribute kinds,
//!   assigned once through a builder and immutable afterwards
//! - [`pipeline`]: dependency resolution (build phase) and ordered replay
//!   (execute phase), with cycle detection and hard-requirement enforcement
//! - [`attributes`]: the built-in kinds — normal, color, lighting, side,
//!   light coordinates — plus the matrix transform operation
//! - [`state`]: the per-worker [`RenderState`] facade that binds sources,
//!   iterates vertex ranges and emits finished vertices
//! - [`backend`]: the narrow emission boundary a graphics backend implements
//!
//! # Usage
//! Each worker constructs and owns one [`RenderState`] over a shared
//! [`Registry`]; rendering a model is `reset` → set context flags → bind →
//! `run`. Rebinding the same source reuses the cached pipeline.

pub mod attributes;
pub mod backend;
pub mod color;
pub mod lighting;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod source;
pub mod state;

pub use backend::{EmittedVertex, PrimitiveMode, Vertex, VertexEmitter};
pub use model::Model;
pub use pipeline::{
    LoadContext, Pipeline, PipelineError, PipelineResult, VertexAttribute, VertexOperation,
};
pub use registry::{AttributeIndex, OperationId, Registry, StandardAttributes};
pub use source::VertexSource;
pub use state::{RenderState, VertexContext};
