//! tetramesh - Framework/engine independent SDF chunk meshing
//!
//! This crate converts an ordered list of signed-distance-field shape
//! descriptors into triangulated surface meshes, generated and streamed in
//! spatial chunks. The core algorithm is marching tetrahedra over a per-chunk
//! field lattice: each cell decomposes into a fixed 6-tetrahedra tiling and
//! triangulates its zero crossings with interpolated positions and normals.
//!
//! # Features
//!
//! - **Shape fields**: analytic sphere/box kernels and a domain-warped value
//!   noise terrain, extensible through a kernel dispatch table
//! - **CSG blending**: sequential, order-dependent folding of shapes with
//!   Union/Subtraction/Smooth/Repel/Lerp operators
//! - **Marching tetrahedra**: watertight-per-cell triangulation with exact
//!   vertex welding across shared edges
//! - **Chunk streaming**: a scheduler that keeps a bounded working set of
//!   chunks near a moving reference point, one load/evict per tick
//!
//! # Example
//!
//! ```ignore
//! use glam::{Affine3A, Vec3, Vec3A};
//! use tetramesh::{ChunkScheduler, GenerateConfig, KernelTable, ShapeDescriptor};
//!
//! let shapes = vec![ShapeDescriptor::sphere(Affine3A::from_scale(Vec3::splat(8.0)))];
//! let mut scheduler = ChunkScheduler::new(GenerateConfig::default(), KernelTable::default());
//!
//! scheduler.start()?;
//! scheduler.step(Vec3A::ZERO, &shapes, &mut consumer)?;
//! scheduler.end(&mut consumer);
//! ```

pub mod constants;
pub mod tet_table;
pub mod types;

// Re-export commonly used items
pub use constants::{LatticeDims, CORNER_OFFSETS, MAX_TRIS_PER_CELL};
pub use tet_table::{TET_CASES, TET_CORNERS, TET_EDGE_CORNERS};
pub use types::{
  GenerateConfig, GenerateMode, GenerationStats, MeshBuffer, MinMaxAABB, Triangle, Vertex,
};

// Field sources: noise, shapes, and blend operators
pub mod blend;
pub mod noise;
pub mod shapes;
pub use blend::{BlendKernel, BlendMode, FieldSample};
pub use shapes::{KernelTable, ShapeDescriptor, ShapeKernel, ShapeKind};

// Field lattice and marching-tetrahedra mesher
pub mod lattice;
pub mod tetra;
pub use lattice::{FieldLattice, FieldPoint};
pub use tetra::TriangleBuffer;

// Mesh assembly (welding, batch splitting)
pub mod assembler;

// Chunk generation pipeline
pub mod pipeline;
pub use pipeline::{
  AsyncChunkPipeline, ChunkKey, ChunkMeshes, ChunkStorage, MeshConsumer, MeshData, PipelineError,
};

// Streaming chunk scheduler
pub mod scheduler;
pub use scheduler::{ChunkScheduler, SchedulerState, StepReport};

// Generation metrics (feature-gated collection)
pub mod metrics;
