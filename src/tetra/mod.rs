//! Marching-tetrahedra mesher.
//!
//! Consumes a built field lattice and emits raw triangles where the field
//! crosses zero. Each cell decomposes into the fixed 6 tetrahedra of
//! [`crate::tet_table`]; each tetrahedron triangulates independently from its
//! 4-corner sign pattern with linearly interpolated crossing positions and
//! normals.
//!
//! Output goes into a fixed-capacity arena: [`crate::constants::MAX_TRIS_PER_CELL`]
//! slots per cell plus a per-cell count, so the assembler reads only the
//! valid prefix of each cell's slots. Cells are independent and meshed with a
//! rayon parallel-for over disjoint slot ranges; the parallel iterator
//! completes before the assembler runs, which is the synchronization barrier
//! between the parallel and sequential halves of the pipeline.
//!
//! Edge interpolation is canonicalized to run from the lower lattice index to
//! the higher, so a crossing shared by neighboring tetrahedra or cells
//! produces bit-identical positions and welds exactly.

use glam::Vec3A;
use rayon::prelude::*;

use crate::blend::nlerp;
use crate::constants::{LatticeDims, MAX_TRIS_PER_CELL};
use crate::lattice::{FieldLattice, FieldPoint};
use crate::pipeline::PipelineError;
use crate::tet_table::{TET_CASES, TET_CORNERS, TET_EDGE_CORNERS};
use crate::types::Triangle;

/// Reusable per-chunk triangle arena with per-cell valid counts.
#[derive(Default)]
pub struct TriangleBuffer {
  triangles: Vec<Triangle>,
  counts: Vec<u8>,
}

impl TriangleBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Size the arena for a chunk's cell count, reusing storage when the size
  /// is unchanged and reallocating when it differs.
  pub fn prepare(&mut self, cell_count: usize) -> Result<(), PipelineError> {
    let needed = cell_count * MAX_TRIS_PER_CELL;
    if self.counts.len() == cell_count {
      self.counts.fill(0);
      return Ok(());
    }

    self.triangles.clear();
    self.counts.clear();
    self
      .triangles
      .try_reserve(needed)
      .map_err(|_| PipelineError::BufferAlloc {
        bytes: needed * std::mem::size_of::<Triangle>(),
      })?;
    self
      .counts
      .try_reserve(cell_count)
      .map_err(|_| PipelineError::BufferAlloc { bytes: cell_count })?;
    self.triangles.resize(needed, Triangle::default());
    self.counts.resize(cell_count, 0);
    Ok(())
  }

  /// Number of cells the arena is sized for.
  pub fn cell_count(&self) -> usize {
    self.counts.len()
  }

  /// Valid triangles of one cell.
  #[inline]
  pub fn cell_triangles(&self, cell_index: usize) -> &[Triangle] {
    let start = cell_index * MAX_TRIS_PER_CELL;
    &self.triangles[start..start + self.counts[cell_index] as usize]
  }

  /// Iterate every valid triangle, skipping unused slots via the counts.
  pub fn iter(&self) -> impl Iterator<Item = &Triangle> {
    self
      .counts
      .iter()
      .enumerate()
      .flat_map(move |(cell, &count)| {
        let start = cell * MAX_TRIS_PER_CELL;
        self.triangles[start..start + count as usize].iter()
      })
  }

  /// Total valid triangles across all cells.
  pub fn triangle_count(&self) -> usize {
    self.counts.iter().map(|&c| c as usize).sum()
  }
}

/// Triangulate the zero crossing of a built lattice.
///
/// `output` must be prepared for the lattice's cell count. Returns the total
/// triangle count.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "tetra::generate")
)]
pub fn generate(lattice: &FieldLattice, output: &mut TriangleBuffer, flip_normals: bool) -> usize {
  let Some(dims) = lattice.dims() else {
    return 0;
  };
  debug_assert_eq!(output.cell_count(), dims.cell_count());

  let points = lattice.points();
  output
    .triangles
    .par_chunks_exact_mut(MAX_TRIS_PER_CELL)
    .zip(output.counts.par_iter_mut())
    .enumerate()
    .for_each(|(cell_index, (slots, count))| {
      *count = mesh_cell(points, dims, cell_index, slots, flip_normals);
    });

  output.triangle_count()
}

/// Triangulate one cell into its slot range. Returns the triangle count.
fn mesh_cell(
  points: &[FieldPoint],
  dims: LatticeDims,
  cell_index: usize,
  slots: &mut [Triangle],
  flip_normals: bool,
) -> u8 {
  let cell = dims.cell_coord(cell_index);
  let corner_indices = dims.cell_corner_indices(cell);

  // Early exit for homogeneous cells (all solid or all air).
  let mut cube_mask = 0u8;
  for (i, &index) in corner_indices.iter().enumerate() {
    if points[index].is_inside() {
      cube_mask |= 1 << i;
    }
  }
  if cube_mask == 0 || cube_mask == 255 {
    return 0;
  }

  let mut emitted = 0usize;
  for tet in &TET_CORNERS {
    let tet_points: [usize; 4] = std::array::from_fn(|i| corner_indices[tet[i] as usize]);

    let mut mask = 0usize;
    for (i, &index) in tet_points.iter().enumerate() {
      if points[index].is_inside() {
        mask |= 1 << i;
      }
    }

    let case = &TET_CASES[mask];
    for tri_edges in case.tris.iter().take(case.tri_count as usize) {
      slots[emitted] = emit_triangle(points, &tet_points, tri_edges, flip_normals);
      emitted += 1;
    }
  }

  emitted as u8
}

/// Build one triangle from three crossing edges of a tetrahedron.
fn emit_triangle(
  points: &[FieldPoint],
  tet_points: &[usize; 4],
  edges: &[u8; 3],
  flip_normals: bool,
) -> Triangle {
  let [(a, na), (b, nb), (c, nc)] =
    std::array::from_fn(|i| edge_crossing(points, tet_points, edges[i]));

  // Wind so the geometric normal agrees with the interpolated field normals,
  // which point toward the outside sign.
  let outward = na + nb + nc;
  let geometric = (b - a).cross(c - a);
  let swap = (geometric.dot(outward) < 0.0) != flip_normals;

  let sign = if flip_normals { -1.0 } else { 1.0 };
  if swap {
    Triangle {
      a,
      b: c,
      c: b,
      na: na * sign,
      nb: nc * sign,
      nc: nb * sign,
    }
  } else {
    Triangle {
      a,
      b,
      c,
      na: na * sign,
      nb: nb * sign,
      nc: nc * sign,
    }
  }
}

/// Interpolated zero crossing on one tetrahedron edge.
///
/// Interpolation always runs from the lower lattice index to the higher so
/// shared edges reproduce the exact same bits in every tetrahedron and cell
/// that touches them.
#[inline]
fn edge_crossing(points: &[FieldPoint], tet_points: &[usize; 4], edge: u8) -> (Vec3A, Vec3A) {
  let [c0, c1] = TET_EDGE_CORNERS[edge as usize];
  let mut i0 = tet_points[c0 as usize];
  let mut i1 = tet_points[c1 as usize];
  if i0 > i1 {
    std::mem::swap(&mut i0, &mut i1);
  }

  let p0 = &points[i0];
  let p1 = &points[i1];
  let t = -p0.value / (p1.value - p0.value);
  let position = p0.position + (p1.position - p0.position) * t;
  let normal = nlerp(p0.normal, p1.normal, t);
  (position, normal)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
