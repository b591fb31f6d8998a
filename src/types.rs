//! Core data types for field meshing.

use glam::{Affine3A, IVec3, Vec3, Vec3A};

use crate::constants::MIN_CELLS_PER_AXIS;

/// Raw triangle as emitted by the mesher, before welding.
///
/// Positions are chunk-local; normals are unit field gradients. Numerically
/// coincident crossings can make a triangle degenerate (zero area); the
/// assembler filters those out.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Triangle {
  pub a: Vec3A,
  pub b: Vec3A,
  pub c: Vec3A,
  pub na: Vec3A,
  pub nb: Vec3A,
  pub nc: Vec3A,
}

impl Triangle {
  /// True when any two corners are bit-identical, i.e. the triangle has no
  /// area worth keeping.
  #[inline]
  pub fn is_degenerate(&self) -> bool {
    self.a == self.b || self.b == self.c || self.a == self.c
  }
}

/// Output vertex after welding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  /// Position in chunk-local coordinates.
  pub position: [f32; 3],

  /// Surface normal (unit vector).
  pub normal: [f32; 3],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
    }
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// One welded, independently indexed mesh batch.
#[derive(Clone, Default)]
pub struct MeshBuffer {
  /// Welded vertices with positions and normals.
  pub vertices: Vec<Vertex>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Bounding box, computed analytically from the chunk extent.
  pub bounds: MinMaxAABB,
}

impl MeshBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Number of triangles in the batch.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }
}

/// Which chunks the scheduler keeps resident.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerateMode {
  /// Every chunk of the configured grid is regenerated each step. No
  /// eviction; the whole grid is always resident.
  Realtime,

  /// A bounded working set follows the reference point: at most one chunk is
  /// loaded and at most one evicted per step.
  Streaming,
}

impl Default for GenerateMode {
  fn default() -> Self {
    GenerateMode::Realtime
  }
}

/// Configuration for a generation pass.
///
/// Read at `start()`, immutable while generating. Counts are clamped to valid
/// minimums on construction so malformed values never reach the pipeline.
#[derive(Clone, Debug)]
pub struct GenerateConfig {
  /// Cells per chunk on each axis.
  pub cell_count: IVec3,

  /// World-space size of one cell on each axis.
  pub cell_scale: Vec3,

  /// Chunk-grid extent: how many chunks the scheduler keeps per axis.
  pub chunk_count: IVec3,

  /// Flip triangle winding and negate normals (inside-out meshes).
  pub flip_normals: bool,

  /// Maximum vertices one mesh batch may hold; excess splits into further
  /// batches, never truncates.
  pub max_vertices_per_mesh: usize,

  /// Scheduler residency mode.
  pub mode: GenerateMode,

  /// Grid frame: chunk-local coordinates map through this to world space.
  pub transform: Affine3A,
}

impl Default for GenerateConfig {
  fn default() -> Self {
    Self {
      cell_count: IVec3::splat(8),
      cell_scale: Vec3::ONE,
      chunk_count: IVec3::splat(4),
      flip_normals: false,
      max_vertices_per_mesh: 65_535,
      mode: GenerateMode::default(),
      transform: Affine3A::IDENTITY,
    }
  }
}

impl GenerateConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_cell_count(mut self, cells: IVec3) -> Self {
    self.cell_count = cells.max(IVec3::splat(MIN_CELLS_PER_AXIS));
    self
  }

  pub fn with_cell_scale(mut self, scale: Vec3) -> Self {
    self.cell_scale = scale.max(Vec3::splat(1e-6));
    self
  }

  pub fn with_chunk_count(mut self, chunks: IVec3) -> Self {
    self.chunk_count = chunks.max(IVec3::ONE);
    self
  }

  pub fn with_flip_normals(mut self, flip: bool) -> Self {
    self.flip_normals = flip;
    self
  }

  pub fn with_max_vertices_per_mesh(mut self, max: usize) -> Self {
    self.max_vertices_per_mesh = max.max(3);
    self
  }

  pub fn with_mode(mut self, mode: GenerateMode) -> Self {
    self.mode = mode;
    self
  }

  pub fn with_transform(mut self, transform: Affine3A) -> Self {
    self.transform = transform;
    self
  }

  /// World-space size of one chunk (before the grid frame is applied).
  #[inline]
  pub fn chunk_extent(&self) -> Vec3 {
    self.cell_count.as_vec3() * self.cell_scale
  }

  /// Transform from one chunk's local space to world space.
  #[inline]
  pub fn chunk_to_world(&self, chunk: IVec3) -> Affine3A {
    let origin = chunk.as_vec3() * self.chunk_extent();
    self.transform * Affine3A::from_translation(origin)
  }

  /// Chunk coordinate containing a world-space position.
  #[inline]
  pub fn world_to_chunk(&self, world: Vec3A) -> IVec3 {
    let local = self.transform.inverse().transform_point3a(world);
    let extent = Vec3A::from(self.chunk_extent());
    (local / extent).floor().as_ivec3()
  }
}

/// Per-chunk timing and output stats from one generation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationStats {
  /// Field sampling + blending time in microseconds.
  pub field_us: u64,
  /// Marching-tetrahedra time in microseconds.
  pub mesh_us: u64,
  /// Welding/assembly time in microseconds.
  pub weld_us: u64,
  /// Triangles emitted before welding.
  pub triangle_count: usize,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
