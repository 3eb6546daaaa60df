use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};

use vertex_pipeline::attributes::MatrixTransform;
use vertex_pipeline::color;
use vertex_pipeline::lighting::{LightTransform, SIDE_AXES};
use vertex_pipeline::{
    AttributeIndex, EmittedVertex, LoadContext, Model, OperationId, PipelineError, PipelineResult,
    PrimitiveMode, Registry, RenderState, Vertex, VertexAttribute, VertexContext, VertexEmitter,
    VertexOperation, VertexSource,
};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CollectingEmitter {
    vertices: Vec<EmittedVertex>,
    batches: usize,
}

impl VertexEmitter for CollectingEmitter {
    fn begin(&mut self, _mode: PrimitiveMode) {
        self.batches += 1;
    }

    fn emit_vertex(&mut self, vertex: &EmittedVertex) {
        self.vertices.push(*vertex);
    }

    fn end(&mut self) {}
}

fn quad() -> Vec<Vertex> {
    (0..4)
        .map(|i| {
            Vertex::new(
                Vec3::new(i as f32, 0.0, (i % 2) as f32),
                Vec2::new(i as f32 * 0.25, 0.0),
            )
        })
        .collect()
}

/// State with every optional attribute disabled, so only what a test enables
/// participates in resolution.
fn bare_state(registry: Arc<Registry>) -> RenderState {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut state = RenderState::new(registry);
    state.context.use_color = false;
    state.context.compute_lighting = false;
    state
}

// ---------------------------------------------------------------------------
// Dependency resolution
// ---------------------------------------------------------------------------

#[test]
fn side_supplied_normals_derive_from_axis() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();
    let model: Arc<dyn VertexSource> =
        Arc::new(Model::new(quad()).with_attribute(std.side, vec![1u8; 4]));

    let mut state = bare_state(registry.clone());
    state.context.use_normals = true;
    state.bind(model, 0, 4).unwrap();

    // Side runs strictly before the normal that derives from it, each once.
    let pipeline = state.pipeline();
    assert_eq!(pipeline.len(), 2);
    let side_pos = pipeline
        .position_of(registry.attribute(std.side).operation_id())
        .unwrap();
    let normal_pos = pipeline
        .position_of(registry.attribute(std.normal).operation_id())
        .unwrap();
    assert!(side_pos < normal_pos);

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    assert_eq!(emitter.vertices.len(), 4);
    for vertex in &emitter.vertices {
        assert_eq!(vertex.normal, Some(SIDE_AXES[1]));
        assert_eq!(vertex.color, None);
    }
}

#[test]
fn direct_normals_skip_the_side_fallback() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();
    let model: Arc<dyn VertexSource> =
        Arc::new(Model::new(quad()).with_attribute(std.normal, vec![Vec3::X; 4]));

    let mut state = bare_state(registry.clone());
    state.context.use_normals = true;
    state.bind(model, 0, 4).unwrap();

    assert_eq!(state.pipeline().len(), 1);
    assert!(state
        .pipeline()
        .position_of(registry.attribute(std.side).operation_id())
        .is_none());

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    for vertex in &emitter.vertices {
        assert_eq!(vertex.normal, Some(Vec3::X));
    }
}

#[test]
fn underivable_normals_fail_and_keep_previous_pipeline() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();

    let mut state = bare_state(registry);
    state.context.use_normals = true;

    let good: Arc<dyn VertexSource> =
        Arc::new(Model::new(quad()).with_attribute(std.side, vec![0u8; 4]));
    state.bind(good, 0, 4).unwrap();
    let resolved_before = state.pipeline().len();

    // Neither normal nor side data: a hard error, not a skip.
    let bare: Arc<dyn VertexSource> = Arc::new(Model::new(quad()));
    let err = state.bind_source(bare).unwrap_err();
    assert!(matches!(err, PipelineError::IllegalConfiguration { .. }));

    // The failed rebuild left the committed pipeline and source usable.
    assert_eq!(state.pipeline().len(), resolved_before);
    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    assert_eq!(emitter.vertices.len(), 4);
    assert_eq!(emitter.vertices[0].normal, Some(SIDE_AXES[0]));
}

// ---------------------------------------------------------------------------
// Rebind triggering
// ---------------------------------------------------------------------------

struct CountingOp {
    id: OperationId,
    loads: AtomicUsize,
}

impl VertexOperation for CountingOp {
    fn name(&self) -> &str {
        "counting"
    }

    fn operation_id(&self) -> OperationId {
        self.id
    }

    fn load(&self, _ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn operate(&self, _ctx: &mut VertexContext, _cache: Option<&(dyn Any + Send + Sync)>) {}
}

#[test]
fn rebinding_same_source_resolves_once() {
    let mut builder = Registry::builder();
    let id = builder.register_operation();
    let registry = Arc::new(builder.build());

    let op = Arc::new(CountingOp {
        id,
        loads: AtomicUsize::new(0),
    });
    let mut state = bare_state(registry);
    let ops: Vec<Arc<dyn VertexOperation>> = vec![op.clone()];
    state.set_operations(ops).unwrap();

    let a: Arc<dyn VertexSource> = Arc::new(Model::new(quad()));
    let b: Arc<dyn VertexSource> = Arc::new(Model::new(quad()));

    state.bind_source(a.clone()).unwrap();
    assert_eq!(op.loads.load(Ordering::SeqCst), 1);

    // Same identity: no resolution pass.
    state.bind_source(a).unwrap();
    assert_eq!(op.loads.load(Ordering::SeqCst), 1);

    // Different identity: exactly one fresh pass.
    state.bind_source(b).unwrap();
    assert_eq!(op.loads.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// Cycles and requirements
// ---------------------------------------------------------------------------

struct CycleAttr {
    index: AttributeIndex,
    op: OperationId,
    other: AttributeIndex,
}

impl VertexOperation for CycleAttr {
    fn name(&self) -> &str {
        "cycle"
    }

    fn operation_id(&self) -> OperationId {
        self.op
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> PipelineResult<bool> {
        ctx.add_dependency(self.other);
        Ok(true)
    }

    fn operate(&self, _ctx: &mut VertexContext, _cache: Option<&(dyn Any + Send + Sync)>) {}
}

impl VertexAttribute for CycleAttr {
    fn attribute_index(&self) -> AttributeIndex {
        self.index
    }

    fn new_array(&self, len: usize) -> Arc<dyn Any + Send + Sync> {
        Arc::new(vec![0u32; len])
    }
}

#[test]
fn cyclic_dependencies_are_rejected() {
    let mut builder = Registry::builder();
    let (a_ix, a_op) = builder.reserve_attribute();
    let (b_ix, b_op) = builder.reserve_attribute();
    builder.install(Arc::new(CycleAttr {
        index: a_ix,
        op: a_op,
        other: b_ix,
    }));
    builder.install(Arc::new(CycleAttr {
        index: b_ix,
        op: b_op,
        other: a_ix,
    }));
    let registry = Arc::new(builder.build());

    let mut state = bare_state(registry.clone());
    state
        .set_operations(vec![registry.attribute_operation(a_ix).clone()])
        .unwrap();

    let err = state
        .bind_source(Arc::new(Model::new(quad())))
        .unwrap_err();
    assert!(matches!(err, PipelineError::CyclicDependency { .. }));
}

#[test]
fn derived_light_coords_require_a_transform() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();

    let mut state = RenderState::new(registry);
    state.context.use_color = false;
    state.context.light = Some(LightTransform::at(Vec3::ZERO));

    let model: Arc<dyn VertexSource> =
        Arc::new(Model::new(quad()).with_attribute(std.side, vec![1u8; 4]));
    let err = state.bind_source(model).unwrap_err();
    assert!(matches!(err, PipelineError::UnsatisfiedRequirement { .. }));
}

#[test]
fn a_requested_transform_satisfies_the_light_coord_requirement() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();

    let mut state = RenderState::new(registry.clone());
    state.context.use_color = false;
    state.context.light = Some(LightTransform::at(Vec3::ZERO));
    state
        .set_operations(vec![Arc::new(MatrixTransform::new(
            &registry,
            Mat4::IDENTITY,
        ))])
        .unwrap();

    let model: Arc<dyn VertexSource> =
        Arc::new(Model::new(quad()).with_attribute(std.side, vec![1u8; 4]));
    state.bind(model, 0, 4).unwrap();

    let pipeline = state.pipeline();
    let transform_pos = pipeline.position_of(std.transform).unwrap();
    let light_coord_pos = pipeline
        .position_of(registry.attribute(std.light_coord).operation_id())
        .unwrap();
    assert!(transform_pos < light_coord_pos);

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    assert_eq!(emitter.vertices.len(), 4);
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[test]
fn bare_pipeline_emits_position_and_uv_only() {
    let registry = Arc::new(Registry::new());
    let verts = quad();
    let model: Arc<dyn VertexSource> = Arc::new(Model::new(verts.clone()));

    let mut state = bare_state(registry);
    state.bind(model, 1, 3).unwrap();
    assert!(state.pipeline().is_empty());

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    assert_eq!(emitter.vertices.len(), 2);
    for (emitted, raw) in emitter.vertices.iter().zip(&verts[1..3]) {
        assert_eq!(emitted.position, raw.position);
        assert_eq!(emitted.uv, raw.uv);
        assert_eq!(emitted.normal, None);
        assert_eq!(emitted.color, None);
        assert_eq!(emitted.brightness, None);
    }
}

#[test]
fn repeated_runs_are_idempotent() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();
    let model: Arc<dyn VertexSource> = Arc::new(
        Model::new(quad())
            .with_attribute(std.side, vec![3u8; 4])
            .with_attribute(std.color, vec![color::pack(0x80, 0x40, 0x20, 0xFF); 4]),
    );

    let mut state = RenderState::new(registry);
    state.context.use_normals = true;
    state.bind(model, 0, 4).unwrap();

    let mut first = CollectingEmitter::default();
    state.run(&mut first).unwrap();
    let mut second = CollectingEmitter::default();
    state.run(&mut second).unwrap();
    assert_eq!(first.vertices, second.vertices);
}

#[test]
fn running_without_a_source_is_an_error() {
    let registry = Arc::new(Registry::new());
    let mut state = RenderState::new(registry);
    let mut emitter = CollectingEmitter::default();
    assert!(matches!(
        state.run(&mut emitter).unwrap_err(),
        PipelineError::NoSource
    ));
}

#[test]
fn reset_restores_default_context_flags() {
    let registry = Arc::new(Registry::new());
    let mut state = RenderState::new(registry);
    state.context.use_normals = true;
    state.context.use_color = false;
    state.context.compute_lighting = false;
    state.context.base_color = 0x1234_5678;
    state.context.alpha_override = Some(7);

    state.reset();
    assert!(!state.context.use_normals);
    assert!(state.context.use_color);
    assert!(state.context.compute_lighting);
    assert_eq!(state.context.base_color, color::WHITE);
    assert_eq!(state.context.alpha_override, None);
    assert!(state.pipeline().is_empty());
}

// ---------------------------------------------------------------------------
// Color and lighting
// ---------------------------------------------------------------------------

#[test]
fn colors_are_modulated_by_base_color() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();
    let tint = color::pack(0x80, 0xFF, 0x80, 0xFF);
    let model: Arc<dyn VertexSource> =
        Arc::new(Model::new(quad()).with_attribute(std.color, vec![tint; 4]));

    let mut state = RenderState::new(registry);
    state.context.base_color = color::pack(0xFF, 0x00, 0x80, 0xFF);
    state.bind(model, 0, 4).unwrap();

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    let expected = color::multiply(state.context.base_color, tint);
    for vertex in &emitter.vertices {
        assert_eq!(vertex.color, Some(expected));
    }
}

#[test]
fn alpha_override_replaces_output_alpha() {
    let registry = Arc::new(Registry::new());
    let model: Arc<dyn VertexSource> = Arc::new(Model::new(quad()));

    let mut state = RenderState::new(registry);
    state.context.alpha_override = Some(0x40);
    state.bind(model, 0, 4).unwrap();

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    for vertex in &emitter.vertices {
        assert_eq!(vertex.color, Some(color::with_alpha(color::WHITE, 0x40)));
    }
}

#[test]
fn lighting_depends_on_and_overrides_color() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();
    let vertex_color = color::pack(0xFF, 0x80, 0x40, 0xFF);
    let light = color::pack(0x80, 0x80, 0x80, 0xFF);
    let model: Arc<dyn VertexSource> = Arc::new(
        Model::new(quad())
            .with_attribute(std.color, vec![vertex_color; 4])
            .with_attribute(std.lighting, vec![light; 4]),
    );

    let mut state = RenderState::new(registry.clone());
    state.bind(model, 0, 4).unwrap();

    let pipeline = state.pipeline();
    let color_pos = pipeline
        .position_of(registry.attribute(std.color).operation_id())
        .unwrap();
    let lighting_pos = pipeline
        .position_of(registry.attribute(std.lighting).operation_id())
        .unwrap();
    assert!(color_pos < lighting_pos);

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    let expected = color::multiply(color::multiply(color::WHITE, vertex_color), light);
    assert_eq!(emitter.vertices[0].color, Some(expected));
}

// ---------------------------------------------------------------------------
// Explicit override and lazy sources
// ---------------------------------------------------------------------------

#[test]
fn explicit_pipeline_skips_dependency_expansion() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();
    let model: Arc<dyn VertexSource> =
        Arc::new(Model::new(quad()).with_attribute(std.side, vec![1u8; 4]));

    let mut state = bare_state(registry.clone());
    state.bind(model, 0, 4).unwrap();
    state
        .set_pipeline(&[registry.attribute_operation(std.normal).clone()])
        .unwrap();

    // The side dependency the normal declared was discarded: the pipeline
    // holds exactly the caller's list, and the normal falls back to the
    // default side scratch instead of the source's side array.
    assert_eq!(state.pipeline().len(), 1);
    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    assert_eq!(emitter.vertices[0].normal, Some(SIDE_AXES[0]));
}

#[test]
fn explicit_transform_offsets_positions() {
    let registry = Arc::new(Registry::new());
    let verts = quad();
    let model: Arc<dyn VertexSource> = Arc::new(Model::new(verts.clone()));

    let mut state = bare_state(registry.clone());
    state.bind(model, 0, 4).unwrap();
    let transform: Arc<dyn VertexOperation> = Arc::new(MatrixTransform::new(
        &registry,
        Mat4::from_translation(Vec3::X),
    ));
    state.set_pipeline(&[transform]).unwrap();

    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    for (emitted, raw) in emitter.vertices.iter().zip(&verts) {
        assert_eq!(emitted.position, raw.position + Vec3::X);
    }
}

struct LazyNormalSource {
    vertices: Vec<Vertex>,
    normal_index: AttributeIndex,
}

impl VertexSource for LazyNormalSource {
    fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn attribute(&self, _index: AttributeIndex) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }

    fn has_attribute(&self, index: AttributeIndex) -> bool {
        index == self.normal_index
    }

    fn prepare_vertex(&self, context: &mut VertexContext) {
        context.set_normal(Vec3::Y);
    }
}

#[test]
fn sources_can_push_attributes_per_vertex() {
    let registry = Arc::new(Registry::new());
    let std = registry.standard();
    let source: Arc<dyn VertexSource> = Arc::new(LazyNormalSource {
        vertices: quad(),
        normal_index: std.normal,
    });

    let mut state = bare_state(registry);
    state.context.use_normals = true;
    state.bind(source, 0, 4).unwrap();

    // Declared-but-array-less: the normal operation drops out and the
    // source pushes the value before each vertex instead.
    assert!(state.pipeline().is_empty());
    let mut emitter = CollectingEmitter::default();
    state.run(&mut emitter).unwrap();
    assert_eq!(emitter.vertices.len(), 4);
    for vertex in &emitter.vertices {
        assert_eq!(vertex.normal, Some(Vec3::Y));
    }
}

// ---------------------------------------------------------------------------
// Convenience entry point
// ---------------------------------------------------------------------------

#[test]
fn render_binds_ranges_and_runs_in_one_call() {
    let registry = Arc::new(Registry::new());
    let model: Arc<dyn VertexSource> = Arc::new(Model::new(quad()));

    let mut state = RenderState::new(registry);
    let mut emitter = CollectingEmitter::default();
    emitter.begin(PrimitiveMode::Quads);
    state.render(model, Vec::new(), &mut emitter).unwrap();
    emitter.end();

    assert_eq!(emitter.batches, 1);
    assert_eq!(emitter.vertices.len(), 4);
    // Default flags: color on, so the base color is emitted.
    assert_eq!(emitter.vertices[0].color, Some(color::WHITE));
}
