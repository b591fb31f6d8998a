//! Lattice layout for chunk field storage.
//!
//! A chunk samples the field on a regular lattice of `cells + 1` points per
//! axis, so every cell owns its 8 corner samples and adjacent cells share the
//! points on their common face.
//!
//! # Point Indexing
//!
//! ```text
//! index = x * (Y+1) * (Z+1) + y * (Z+1) + z
//! ```
//!
//! where `(X, Y, Z)` is the cell count per axis. X is the major axis, Z the
//! minor; a Z-column is contiguous in memory.
//!
//! # Coordinate System
//!
//! ```text
//!         +Y
//!          │
//!          │
//!          │
//!          └───────── +X
//!         /
//!        /
//!       +Z
//!
//! Cell corner indices (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

use glam::IVec3;

/// Upper bound of triangles one cell can emit: 6 tetrahedra, at most 2
/// triangles each. Sizes the per-chunk triangle arena.
pub const MAX_TRIS_PER_CELL: usize = 12;

/// Smallest accepted cell count per axis. Non-positive configuration values
/// are clamped up to this before they reach the pipeline.
pub const MIN_CELLS_PER_AXIS: i32 = 1;

/// Lattice corner offsets in cell-local coordinates (binary ZYX order).
pub const CORNER_OFFSETS: [IVec3; 8] = [
  IVec3::new(0, 0, 0),
  IVec3::new(1, 0, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(1, 1, 0),
  IVec3::new(0, 0, 1),
  IVec3::new(1, 0, 1),
  IVec3::new(0, 1, 1),
  IVec3::new(1, 1, 1),
];

/// Sample-grid dimensions for one chunk.
///
/// Wraps the configured cell count and derives point/cell indexing from it.
/// All axes are clamped to at least [`MIN_CELLS_PER_AXIS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeDims {
  cells: IVec3,
}

impl LatticeDims {
  pub fn new(cells: IVec3) -> Self {
    Self {
      cells: cells.max(IVec3::splat(MIN_CELLS_PER_AXIS)),
    }
  }

  /// Cells per axis.
  #[inline]
  pub fn cells(&self) -> IVec3 {
    self.cells
  }

  /// Lattice points per axis (`cells + 1`).
  #[inline]
  pub fn points(&self) -> IVec3 {
    self.cells + IVec3::ONE
  }

  /// Total lattice points in the chunk.
  #[inline]
  pub fn point_count(&self) -> usize {
    let p = self.points();
    p.x as usize * p.y as usize * p.z as usize
  }

  /// Total cells in the chunk.
  #[inline]
  pub fn cell_count(&self) -> usize {
    self.cells.x as usize * self.cells.y as usize * self.cells.z as usize
  }

  /// Linear index of the lattice point at `(x, y, z)`.
  #[inline]
  pub fn point_index(&self, x: i32, y: i32, z: i32) -> usize {
    let p = self.points();
    (x * p.y * p.z + y * p.z + z) as usize
  }

  /// Lattice coordinates of the point at a linear index.
  #[inline]
  pub fn point_coord(&self, index: usize) -> IVec3 {
    let p = self.points();
    let yz = (p.y * p.z) as usize;
    let x = index / yz;
    let rem = index % yz;
    IVec3::new(x as i32, (rem / p.z as usize) as i32, (rem % p.z as usize) as i32)
  }

  /// Minimum-corner lattice coordinates of the cell at a linear cell index.
  ///
  /// Cells use the same X-major ordering as points, over `cells` per axis.
  #[inline]
  pub fn cell_coord(&self, index: usize) -> IVec3 {
    let yz = (self.cells.y * self.cells.z) as usize;
    let x = index / yz;
    let rem = index % yz;
    IVec3::new(
      x as i32,
      (rem / self.cells.z as usize) as i32,
      (rem % self.cells.z as usize) as i32,
    )
  }

  /// Lattice point indices of a cell's 8 corners, in [`CORNER_OFFSETS`] order.
  #[inline]
  pub fn cell_corner_indices(&self, cell: IVec3) -> [usize; 8] {
    std::array::from_fn(|i| {
      let c = cell + CORNER_OFFSETS[i];
      self.point_index(c.x, c.y, c.z)
    })
  }
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
