//! Graphics backend boundary: shared value types and the emission trait

pub mod traits;
pub mod types;

pub use traits::VertexEmitter;
pub use types::{EmittedVertex, PrimitiveMode, Vertex};
