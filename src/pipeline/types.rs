//! Pipeline I/O types.

use glam::IVec3;
use smallvec::SmallVec;
use thiserror::Error;

use crate::lattice::FieldLattice;
use crate::tetra::TriangleBuffer;
use crate::types::{MeshBuffer, MinMaxAABB};

/// 3D integer chunk coordinate.
pub type ChunkKey = IVec3;

/// Hard pipeline failures.
///
/// Everything else in the pipeline is a policy (empty shape lists, oversized
/// meshes, missing eviction candidates), not an error. Failing to reserve
/// chunk storage is the one condition that aborts a generation pass; the
/// caller may retry after freeing resources.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("failed to reserve {bytes} bytes of chunk storage")]
  BufferAlloc { bytes: usize },
}

/// Reusable storage for one chunk's generation: the field lattice and the
/// triangle arena. Acquired at generation start, recycled across chunks by
/// the scheduler, released at `end()`.
#[derive(Default)]
pub struct ChunkStorage {
  pub lattice: FieldLattice,
  pub triangles: TriangleBuffer,
}

impl ChunkStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

/// All mesh batches generated for one chunk.
pub struct ChunkMeshes {
  pub key: ChunkKey,
  /// Welded batches; more than one only when the vertex limit split output.
  pub buffers: SmallVec<[MeshBuffer; 1]>,
}

impl ChunkMeshes {
  /// A chunk that produced no geometry.
  pub fn empty(key: ChunkKey) -> Self {
    Self {
      key,
      buffers: SmallVec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.buffers.iter().all(|b| b.is_empty())
  }

  pub fn triangle_count(&self) -> usize {
    self.buffers.iter().map(|b| b.triangle_count()).sum()
  }

  pub fn vertex_count(&self) -> usize {
    self.buffers.iter().map(|b| b.vertices.len()).sum()
  }
}

/// Receiver of generated geometry.
///
/// `submit` replaces whatever the consumer holds for that chunk; `retire`
/// removes it. The scheduler retires before every submit and retires
/// explicitly for chunks that generated no triangles, so stale geometry is
/// never left visible.
pub trait MeshConsumer {
  fn submit(&mut self, meshes: &ChunkMeshes);
  fn retire(&mut self, key: ChunkKey);
}

/// Byte-level mesh data for FFI to game engines.
#[derive(Clone)]
pub struct MeshData {
  /// Vertex data as raw bytes (position then normal, 6 × f32 LE per vertex).
  pub vertices: Vec<u8>,

  /// Index data as raw bytes (u32 LE).
  pub indices: Vec<u8>,

  /// Number of vertices.
  pub vertex_count: u32,

  /// Number of indices.
  pub index_count: u32,

  /// Mesh bounding box.
  pub bounds: MinMaxAABB,
}

impl MeshData {
  /// Serialize one welded batch.
  pub fn from_buffer(buffer: &MeshBuffer) -> Self {
    let mut vertices = Vec::with_capacity(buffer.vertices.len() * 24);
    for vertex in &buffer.vertices {
      for value in vertex.position.iter().chain(vertex.normal.iter()) {
        vertices.extend_from_slice(&value.to_le_bytes());
      }
    }
    let mut indices = Vec::with_capacity(buffer.indices.len() * 4);
    for index in &buffer.indices {
      indices.extend_from_slice(&index.to_le_bytes());
    }
    Self {
      vertices,
      indices,
      vertex_count: buffer.vertices.len() as u32,
      index_count: buffer.indices.len() as u32,
      bounds: buffer.bounds,
    }
  }
}

impl std::fmt::Debug for MeshData {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MeshData")
      .field("vertex_count", &self.vertex_count)
      .field("index_count", &self.index_count)
      .field("bounds", &self.bounds)
      .finish()
  }
}
