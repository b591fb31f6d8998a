//! Fixed tetrahedral decomposition of a lattice cell.
//!
//! Every cell is split into 6 tetrahedra sharing the cube's main diagonal
//! (corner 0 to corner 7). Six is the minimal decomposition that tiles space
//! without gaps, and the shared-diagonal form cuts every cube face along the
//! same diagonal as the neighboring cell, so triangulated surfaces meet
//! exactly across cell boundaries.
//!
//! # Cube Topology
//!
//! ```text
//!       6──────7         Corners (binary ZYX):
//!      /│     /│           0=(0,0,0)  1=(1,0,0)  2=(0,1,0)  3=(1,1,0)
//!     4─┼────5 │           4=(0,0,1)  5=(1,0,1)  6=(0,1,1)  7=(1,1,1)
//!     │ 2────┼─3
//!     │/     │/          +Y
//!     0──────1            │  +Z
//!                         │ /
//!                         └───+X
//! ```
//!
//! # Tetrahedron Cases
//!
//! Within one tetrahedron the field corners are classified inside/outside,
//! giving a 4-bit mask. `TET_CASES[mask]` lists which of the 6 tetrahedron
//! edges carry a zero crossing and how the crossings triangulate:
//!
//! ```text
//! inside corners   crossings   output
//! ──────────────   ─────────   ──────────────
//! 0 or 4           none        nothing
//! 1 or 3           3 edges     1 triangle
//! 2                4 edges     2 triangles (quad split)
//! ```
//!
//! Triangle winding is not encoded here; the mesher orients each triangle
//! against the interpolated field normal and applies the global flip flag.

/// Corner indices (cube numbering) of the 6 tetrahedra.
///
/// Every tetrahedron contains the 0–7 main diagonal; consecutive entries
/// share a face, walking once around the diagonal.
pub const TET_CORNERS: [[u8; 4]; 6] = [
  [0, 1, 3, 7],
  [0, 3, 2, 7],
  [0, 2, 6, 7],
  [0, 6, 4, 7],
  [0, 4, 5, 7],
  [0, 5, 1, 7],
];

/// Edge endpoints of one tetrahedron, as indices into its 4 corners.
pub const TET_EDGE_CORNERS: [[u8; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Triangulation of one inside/outside sign pattern.
#[derive(Clone, Copy, Debug)]
pub struct TetCase {
  /// Number of triangles emitted (0, 1, or 2).
  pub tri_count: u8,
  /// Crossing-edge indices per triangle, in [`TET_EDGE_CORNERS`] numbering.
  pub tris: [[u8; 3]; 2],
}

/// Case table indexed by the 4-bit inside mask (bit i set = corner i inside).
pub const TET_CASES: [TetCase; 16] = generate_tet_cases();

/// True when two tetrahedron edges share an endpoint corner.
const fn edges_share_corner(a: u8, b: u8) -> bool {
  let a0 = TET_EDGE_CORNERS[a as usize][0];
  let a1 = TET_EDGE_CORNERS[a as usize][1];
  let b0 = TET_EDGE_CORNERS[b as usize][0];
  let b1 = TET_EDGE_CORNERS[b as usize][1];
  a0 == b0 || a0 == b1 || a1 == b0 || a1 == b1
}

/// Generate the case table at compile time.
const fn generate_tet_cases() -> [TetCase; 16] {
  let empty = TetCase {
    tri_count: 0,
    tris: [[0; 3]; 2],
  };
  let mut table = [empty; 16];

  let mut mask = 0usize;
  while mask < 16 {
    // Collect edges whose endpoints straddle the surface.
    let mut crossing = [0u8; 6];
    let mut n = 0usize;
    let mut e = 0usize;
    while e < 6 {
      let c0 = TET_EDGE_CORNERS[e][0] as usize;
      let c1 = TET_EDGE_CORNERS[e][1] as usize;
      if ((mask >> c0) & 1) != ((mask >> c1) & 1) {
        crossing[n] = e as u8;
        n += 1;
      }
      e += 1;
    }

    if n == 3 {
      table[mask] = TetCase {
        tri_count: 1,
        tris: [[crossing[0], crossing[1], crossing[2]], [0; 3]],
      };
    } else if n == 4 {
      // Two corners on each side: the four crossings form a quad. Order it
      // cyclically (adjacent crossings share a tetrahedron face, i.e. share a
      // corner) and split along the first-to-opposite diagonal.
      let first = crossing[0];
      let mut adjacent = [0u8; 2];
      let mut adjacent_count = 0usize;
      let mut opposite = 0u8;
      let mut i = 1usize;
      while i < 4 {
        if edges_share_corner(first, crossing[i]) {
          adjacent[adjacent_count] = crossing[i];
          adjacent_count += 1;
        } else {
          opposite = crossing[i];
        }
        i += 1;
      }
      table[mask] = TetCase {
        tri_count: 2,
        tris: [
          [first, adjacent[0], opposite],
          [first, opposite, adjacent[1]],
        ],
      };
    }

    mask += 1;
  }

  table
}

#[cfg(test)]
#[path = "tet_table_test.rs"]
mod tet_table_test;
