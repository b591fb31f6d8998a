//! Chunk generation pipeline.
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Lattice Builder ├────►│ Tetra Mesher ├────►│ Mesh Assembler│
//! └─────────────────┘     └──────────────┘     └───────────────┘
//!        │                      │                      │
//!   FieldLattice          TriangleBuffer          ChunkMeshes
//!  (shape fold, rayon    (per-cell slots,        (welded batches,
//!   over points)          rayon over cells)       sequential)
//! ```
//!
//! One chunk's generation is strictly sequential across stages; the
//! parallelism lives inside each stage. Independent chunks may overlap
//! through [`AsyncChunkPipeline`], which duplicates storage per in-flight
//! chunk.

pub mod async_process;
pub mod process;
pub mod types;

pub use async_process::AsyncChunkPipeline;
pub use process::generate_chunk;
pub use types::{ChunkKey, ChunkMeshes, ChunkStorage, MeshConsumer, MeshData, PipelineError};
