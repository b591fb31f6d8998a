//! Mesh assembly: compaction, welding, batch splitting.
//!
//! Reads the valid prefix of each cell's triangle slots, drops degenerate
//! (zero-area) triangles, and welds corners that share an exact position into
//! one vertex. Interpolation on shared edges is bit-deterministic, so exact
//! float equality is the correct weld key inside one chunk.
//!
//! When a batch would exceed the configured vertex limit the assembler closes
//! it and starts a fresh, independently indexed batch — output is split,
//! never truncated.

use std::collections::HashMap;

use glam::Vec3A;
use smallvec::SmallVec;

use crate::blend::normalize_or_up;
use crate::tetra::TriangleBuffer;
use crate::types::{GenerateConfig, MeshBuffer, MinMaxAABB, Triangle, Vertex};

/// Assemble a chunk's triangle arena into welded mesh batches.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "assembler::assemble")
)]
pub fn assemble(triangles: &TriangleBuffer, config: &GenerateConfig) -> SmallVec<[MeshBuffer; 1]> {
  weld_triangles(
    triangles.iter(),
    config.max_vertices_per_mesh,
    chunk_bounds(config),
  )
}

/// Chunk-local bounds from cell count × cell scale.
///
/// Analytic rather than per-vertex: cheaper, and conservative containment is
/// all the consumer needs.
pub fn chunk_bounds(config: &GenerateConfig) -> MinMaxAABB {
  let extent = config.cell_count.as_vec3() * config.cell_scale;
  MinMaxAABB::new([0.0; 3], extent.to_array())
}

/// Weld a triangle stream into indexed batches of at most `max_vertices`
/// vertices each.
pub fn weld_triangles<'a>(
  triangles: impl Iterator<Item = &'a Triangle>,
  max_vertices: usize,
  bounds: MinMaxAABB,
) -> SmallVec<[MeshBuffer; 1]> {
  let max_vertices = max_vertices.max(3);
  let mut batches: SmallVec<[MeshBuffer; 1]> = SmallVec::new();
  let mut batch = WeldBatch::new();

  for triangle in triangles {
    if triangle.is_degenerate() {
      continue;
    }

    // A triangle may introduce up to 3 new vertices; close the batch before
    // it can overflow.
    if batch.vertex_count() + 3 > max_vertices {
      if let Some(buffer) = batch.finish(bounds) {
        batches.push(buffer);
      }
      batch = WeldBatch::new();
    }

    batch.push_triangle(triangle);
  }

  if let Some(buffer) = batch.finish(bounds) {
    batches.push(buffer);
  }

  batches
}

/// One in-progress welded batch.
struct WeldBatch {
  vertices: Vec<Vertex>,
  /// Normal accumulators parallel to `vertices`; normalized at finish so a
  /// position shared by several corners gets one averaged normal.
  normal_sums: Vec<Vec3A>,
  indices: Vec<u32>,
  lookup: HashMap<[u32; 3], u32>,
}

impl WeldBatch {
  fn new() -> Self {
    Self {
      vertices: Vec::new(),
      normal_sums: Vec::new(),
      indices: Vec::new(),
      lookup: HashMap::new(),
    }
  }

  fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  fn push_triangle(&mut self, triangle: &Triangle) {
    let corners = [
      (triangle.a, triangle.na),
      (triangle.b, triangle.nb),
      (triangle.c, triangle.nc),
    ];
    for (position, normal) in corners {
      let index = self.weld_corner(position, normal);
      self.indices.push(index);
    }
  }

  fn weld_corner(&mut self, position: Vec3A, normal: Vec3A) -> u32 {
    let key = position_key(position);
    if let Some(&index) = self.lookup.get(&key) {
      self.normal_sums[index as usize] += normal;
      return index;
    }

    let index = self.vertices.len() as u32;
    self.vertices.push(Vertex {
      position: position.to_array(),
      normal: [0.0; 3],
    });
    self.normal_sums.push(normal);
    self.lookup.insert(key, index);
    index
  }

  fn finish(mut self, bounds: MinMaxAABB) -> Option<MeshBuffer> {
    if self.vertices.is_empty() {
      return None;
    }
    for (vertex, sum) in self.vertices.iter_mut().zip(&self.normal_sums) {
      vertex.normal = normalize_or_up(*sum).to_array();
    }
    Some(MeshBuffer {
      vertices: self.vertices,
      indices: self.indices,
      bounds,
    })
  }
}

/// Exact-equality weld key from position bits.
#[inline]
fn position_key(position: Vec3A) -> [u32; 3] {
  [
    position.x.to_bits(),
    position.y.to_bits(),
    position.z.to_bits(),
  ]
}

#[cfg(test)]
#[path = "assembler_test.rs"]
mod assembler_test;
