//! The per-worker render state facade
//!
//! One [`RenderState`] per execution context, constructed explicitly and
//! never shared: all rendering for that worker reuses the same instance and
//! its cached pipeline, so the per-vertex loop allocates nothing. Binding a
//! different source rebuilds the pipeline; rebinding the same source is a
//! no-op.

use std::sync::Arc;

use glam::Vec3;
use log::debug;

use crate::backend::{EmittedVertex, Vertex, VertexEmitter};
use crate::color;
use crate::lighting::{LightCoord, LightTransform};
use crate::pipeline::{
    build_explicit, Pipeline, PipelineError, PipelineResult, Resolver, VertexOperation,
};
use crate::registry::Registry;
use crate::source::VertexSource;

/// Per-vertex scratch fields and context flags, threaded through every
/// operation.
///
/// Scratch outputs and their `has_*` flags are only meaningful between the
/// start of a vertex's processing and its emission; they are cleared for
/// every vertex.
pub struct VertexContext {
    /// Index of the vertex currently being processed.
    pub vertex_index: usize,

    // context flags
    /// Packed `0xRRGGBBAA` tint every color output is multiplied by.
    pub base_color: u32,
    /// When set, replaces the alpha channel of emitted colors.
    pub alpha_override: Option<u8>,
    pub use_normals: bool,
    pub compute_lighting: bool,
    pub use_color: bool,
    /// Reference transform for derived light coordinates.
    pub light: Option<LightTransform>,

    // per-vertex outputs
    pub vert: Vertex,
    pub has_normal: bool,
    pub normal: Vec3,
    pub has_color: bool,
    pub color: u32,
    pub has_brightness: bool,
    pub brightness: u32,

    // attribute scratch
    pub side: u8,
    pub light_coord: LightCoord,
}

impl VertexContext {
    fn new() -> Self {
        Self {
            vertex_index: 0,
            base_color: color::WHITE,
            alpha_override: None,
            use_normals: false,
            compute_lighting: true,
            use_color: true,
            light: None,
            vert: Vertex::default(),
            has_normal: false,
            normal: Vec3::ZERO,
            has_color: false,
            color: color::WHITE,
            has_brightness: false,
            brightness: 0,
            side: 0,
            light_coord: LightCoord::default(),
        }
    }

    pub fn set_normal(&mut self, normal: Vec3) {
        self.has_normal = true;
        self.normal = normal;
    }

    /// Set the packed color output for this vertex.
    pub fn set_color(&mut self, color: u32) {
        self.has_color = true;
        self.color = color;
    }

    pub fn set_brightness(&mut self, brightness: u32) {
        self.has_brightness = true;
        self.brightness = brightness;
    }

    fn clear_vertex(&mut self) {
        self.has_normal = false;
        self.has_color = false;
        self.has_brightness = false;
    }

    fn output_color(&self) -> u32 {
        match self.alpha_override {
            Some(alpha) => color::with_alpha(self.color, alpha),
            None => self.color,
        }
    }
}

/// The facade tying registry, source, pipeline and scratch together.
pub struct RenderState {
    registry: Arc<Registry>,
    pipeline: Pipeline,
    source: Option<Arc<dyn VertexSource>>,
    /// Caller-requested operations fed through resolution alongside the
    /// flag-enabled attributes (transforms, custom operations).
    requested: Vec<Arc<dyn VertexOperation>>,
    first_vertex: usize,
    last_vertex: usize,
    /// Context flags and per-vertex scratch, mutated by every operation.
    pub context: VertexContext,
}

impl RenderState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            pipeline: Pipeline::default(),
            source: None,
            requested: Vec::new(),
            first_vertex: 0,
            last_vertex: 0,
            context: VertexContext::new(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The currently resolved pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Clear the source, requested operations and per-vertex flags, and
    /// restore default context flags: lighting on, color on, normals off,
    /// no alpha override. The pipeline object is kept; only its resolved
    /// list is dropped.
    pub fn reset(&mut self) {
        self.source = None;
        self.requested.clear();
        self.pipeline.clear();
        self.first_vertex = 0;
        self.last_vertex = 0;
        let ctx = &mut self.context;
        ctx.use_normals = false;
        ctx.compute_lighting = true;
        ctx.use_color = true;
        ctx.base_color = color::WHITE;
        ctx.alpha_override = None;
        ctx.clear_vertex();
    }

    /// Dynamic-render helper: normals on, lighting off.
    pub fn set_dynamic(&mut self) {
        self.context.use_normals = true;
        self.context.compute_lighting = false;
    }

    /// Bind a vertex source, rebuilding the pipeline if the source identity
    /// changed. Rebinding the same source is a no-op. On failure the
    /// previous source and pipeline stay committed.
    pub fn bind_source(&mut self, source: Arc<dyn VertexSource>) -> PipelineResult<()> {
        if let Some(bound) = &self.source {
            if Arc::ptr_eq(bound, &source) {
                return Ok(());
            }
        }
        self.rebind(source)
    }

    /// Bind plus vertex range in one call.
    pub fn bind(
        &mut self,
        source: Arc<dyn VertexSource>,
        start: usize,
        end: usize,
    ) -> PipelineResult<()> {
        self.bind_source(source)?;
        self.set_vertex_range(start, end);
        Ok(())
    }

    fn rebind(&mut self, source: Arc<dyn VertexSource>) -> PipelineResult<()> {
        let resolved = self.resolve_for(source.as_ref())?;
        debug!("bound new vertex source, {} operations active", resolved.len());
        self.source = Some(source);
        self.pipeline = resolved;
        Ok(())
    }

    fn resolve_for(&self, source: &dyn VertexSource) -> PipelineResult<Pipeline> {
        let requested = self.requested_ops();
        Resolver::new(&self.registry, source, &self.context).resolve(&requested)
    }

    /// The requested set for a source-driven rebuild: flag-enabled built-in
    /// attributes merged with the caller's operations. The fixed order
    /// places transforms after normals are produced and before light
    /// coordinates read transformed positions; everything else is ordered
    /// by declared dependencies.
    fn requested_ops(&self) -> Vec<Arc<dyn VertexOperation>> {
        let std = self.registry.standard();
        let ctx = &self.context;
        let mut ops: Vec<Arc<dyn VertexOperation>> = Vec::new();
        if ctx.use_color {
            ops.push(self.registry.attribute_operation(std.color).clone());
        }
        if ctx.compute_lighting && ctx.use_color {
            ops.push(self.registry.attribute_operation(std.lighting).clone());
        }
        if ctx.use_normals {
            ops.push(self.registry.attribute_operation(std.normal).clone());
        }
        ops.extend(self.requested.iter().cloned());
        if ctx.compute_lighting && ctx.light.is_some() {
            ops.push(self.registry.attribute_operation(std.light_coord).clone());
        }
        ops
    }

    /// Set the operations fed through resolution (transforms and other
    /// non-attribute work). Rebuilds immediately when a source is bound.
    pub fn set_operations(&mut self, ops: Vec<Arc<dyn VertexOperation>>) -> PipelineResult<()> {
        self.requested = ops;
        if let Some(source) = self.source.clone() {
            self.pipeline = self.resolve_for(source.as_ref())?;
        }
        Ok(())
    }

    /// Explicit pipeline override: the given operations run in exactly this
    /// order, with no dependency resolution and no requirement enforcement.
    /// Each operation's `load` still runs once to capture its caches.
    pub fn set_pipeline(&mut self, ops: &[Arc<dyn VertexOperation>]) -> PipelineResult<()> {
        self.pipeline = build_explicit(
            &self.registry,
            self.source.as_deref(),
            &self.context,
            ops,
        )?;
        Ok(())
    }

    /// Select the half-open vertex range `[start, end)` for the next run.
    pub fn set_vertex_range(&mut self, start: usize, end: usize) {
        self.first_vertex = start;
        self.last_vertex = end;
    }

    /// Bind `source`, resolve with `ops`, and run over every vertex.
    pub fn render(
        &mut self,
        source: Arc<dyn VertexSource>,
        ops: Vec<Arc<dyn VertexOperation>>,
        emitter: &mut dyn VertexEmitter,
    ) -> PipelineResult<()> {
        self.requested = ops;
        let count = source.vertices().len();
        self.rebind(source)?;
        self.set_vertex_range(0, count);
        self.run(emitter)
    }

    /// Process the selected vertex range in strictly increasing order: for
    /// each vertex, clear the per-vertex flags, let the source push lazy
    /// values, copy the raw position/UV, replay the resolved pipeline, and
    /// emit. No allocation happens inside the loop.
    pub fn run(&mut self, emitter: &mut dyn VertexEmitter) -> PipelineResult<()> {
        let source = self.source.clone().ok_or(PipelineError::NoSource)?;
        let verts = source.vertices();
        for index in self.first_vertex..self.last_vertex {
            self.context.vertex_index = index;
            self.context.clear_vertex();
            source.prepare_vertex(&mut self.context);
            self.context.vert = verts[index];
            self.pipeline.operate(&mut self.context);
            self.write_vertex(emitter);
        }
        Ok(())
    }

    fn write_vertex(&self, emitter: &mut dyn VertexEmitter) {
        let ctx = &self.context;
        emitter.emit_vertex(&EmittedVertex {
            position: ctx.vert.position,
            uv: ctx.vert.uv,
            normal: ctx.has_normal.then_some(ctx.normal),
            color: ctx.has_color.then_some(ctx.output_color()),
            brightness: ctx.has_brightness.then_some(ctx.brightness),
        });
    }
}
