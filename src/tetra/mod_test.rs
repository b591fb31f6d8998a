use std::collections::HashMap;
use std::sync::Arc;

use glam::{Affine3A, IVec3, Vec3, Vec3A};

use super::*;
use crate::constants::LatticeDims;
use crate::shapes::{KernelTable, ShapeDescriptor, ShapeKernel, ShapeKind};
use crate::types::Triangle;

/// Build a lattice over `[origin, origin + cells*scale]` and mesh it.
fn mesh_shapes(
  shapes: &[ShapeDescriptor],
  table: &KernelTable,
  cells: IVec3,
  scale: f32,
  origin: Vec3,
  flip_normals: bool,
) -> (TriangleBuffer, usize) {
  let dims = LatticeDims::new(cells);
  let mut lattice = crate::lattice::FieldLattice::new();
  lattice.prepare(dims, Vec3::splat(scale)).unwrap();
  lattice.build(&table.resolve(shapes), &Affine3A::from_translation(origin));

  let mut buffer = TriangleBuffer::new();
  buffer.prepare(dims.cell_count()).unwrap();
  let count = generate(&lattice, &mut buffer, flip_normals);
  (buffer, count)
}

/// Undirected edge histogram over exact corner positions.
///
/// For a closed triangulated surface every edge is shared by exactly two
/// triangles. Interpolation is bit-deterministic, so exact position keys
/// pair edges across tetrahedra and cells.
fn edge_histogram(triangles: impl Iterator<Item = Triangle>) -> HashMap<([u32; 3], [u32; 3]), usize> {
  let key = |p: Vec3A| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
  let mut edges = HashMap::new();
  for tri in triangles {
    let corners = [key(tri.a), key(tri.b), key(tri.c)];
    for (a, b) in [(0, 1), (1, 2), (2, 0)] {
      let mut pair = (corners[a], corners[b]);
      if pair.0 > pair.1 {
        pair = (pair.1, pair.0);
      }
      *edges.entry(pair).or_insert(0) += 1;
    }
  }
  edges
}

#[test]
fn sphere_mesh_is_watertight() {
  // 16³ cells spanning [-2r, 2r]³ around a unit sphere. The grid origin is
  // nudged off the round numbers so no lattice point lands exactly on the
  // surface (exact zeros degenerate some triangles by construction).
  let table = KernelTable::default();
  let shapes = vec![ShapeDescriptor::sphere(Affine3A::from_scale(Vec3::splat(
    2.0,
  )))];
  let (buffer, count) = mesh_shapes(
    &shapes,
    &table,
    IVec3::splat(16),
    0.25,
    Vec3::new(-2.0132, -2.0077, -2.0049),
    false,
  );

  assert!(count > 0, "sphere should produce triangles");
  for (edge, uses) in edge_histogram(buffer.iter().copied()) {
    assert_eq!(uses, 2, "open edge {edge:?}");
  }
}

#[test]
fn homogeneous_field_emits_nothing() {
  // Sphere entirely outside the chunk.
  let table = KernelTable::default();
  let shapes = vec![ShapeDescriptor::sphere(
    Affine3A::from_translation(Vec3::splat(100.0)),
  )];
  let (buffer, count) = mesh_shapes(
    &shapes,
    &table,
    IVec3::splat(8),
    1.0,
    Vec3::splat(-4.0),
    false,
  );

  assert_eq!(count, 0);
  assert_eq!(buffer.triangle_count(), 0);
}

#[test]
fn per_cell_counts_respect_the_slot_bound() {
  let table = KernelTable::default();
  let shapes = vec![ShapeDescriptor::sphere(Affine3A::from_scale(Vec3::splat(
    3.0,
  )))];
  let (buffer, _) = mesh_shapes(
    &shapes,
    &table,
    IVec3::splat(8),
    0.5,
    Vec3::splat(-2.0),
    false,
  );

  for cell in 0..buffer.cell_count() {
    assert!(buffer.cell_triangles(cell).len() <= crate::constants::MAX_TRIS_PER_CELL);
  }
  let total: usize = (0..buffer.cell_count())
    .map(|c| buffer.cell_triangles(c).len())
    .sum();
  assert_eq!(total, buffer.triangle_count());
}

/// Flat half space at local y = 0, for orientation tests.
struct HalfSpace;

impl ShapeKernel for HalfSpace {
  fn distance(&self, shape: &ShapeDescriptor, world: Vec3A) -> f32 {
    shape.world_to_local.transform_point3a(world).y
  }
}

fn half_space_table() -> KernelTable {
  let mut table = KernelTable::default();
  table.register_shape(ShapeKind::Custom(1), Arc::new(HalfSpace));
  table
}

#[test]
fn plane_triangles_face_the_outside() {
  let table = half_space_table();
  let shapes = vec![ShapeDescriptor::new(ShapeKind::Custom(1), Affine3A::IDENTITY)];
  // Surface crosses mid-chunk: chunk spans y in [-1.5, 2.5].
  let (buffer, count) = mesh_shapes(
    &shapes,
    &table,
    IVec3::splat(4),
    1.0,
    Vec3::new(-2.0, -1.5, -2.0),
    false,
  );

  assert!(count > 0);
  for tri in buffer.iter() {
    // Field normals: straight up, away from the solid half space.
    for n in [tri.na, tri.nb, tri.nc] {
      assert!(n.dot(Vec3A::Y) > 0.99, "field normal {n:?}");
    }
    // Geometric winding agrees with them.
    let geometric = (tri.b - tri.a).cross(tri.c - tri.a);
    assert!(geometric.dot(Vec3A::Y) > 0.0, "winding faces down");
  }
}

#[test]
fn flip_normals_inverts_winding_and_normals() {
  let table = half_space_table();
  let shapes = vec![ShapeDescriptor::new(ShapeKind::Custom(1), Affine3A::IDENTITY)];
  let (buffer, count) = mesh_shapes(
    &shapes,
    &table,
    IVec3::splat(4),
    1.0,
    Vec3::new(-2.0, -1.5, -2.0),
    true,
  );

  assert!(count > 0);
  for tri in buffer.iter() {
    for n in [tri.na, tri.nb, tri.nc] {
      assert!(n.dot(Vec3A::Y) < -0.99, "normal {n:?} not flipped");
    }
    let geometric = (tri.b - tri.a).cross(tri.c - tri.a);
    assert!(geometric.dot(Vec3A::Y) < 0.0, "winding not flipped");
  }
}

#[test]
fn crossings_interpolate_linearly() {
  let table = half_space_table();
  let shapes = vec![ShapeDescriptor::new(ShapeKind::Custom(1), Affine3A::IDENTITY)];
  // Plane at y = 0 with the chunk offset so the crossing sits at
  // one quarter of a cell: lattice y=0 at world -0.25, y=1 at world 0.75.
  let (buffer, count) = mesh_shapes(
    &shapes,
    &table,
    IVec3::splat(2),
    1.0,
    Vec3::new(-1.0, -0.25, -1.0),
    false,
  );

  assert!(count > 0);
  for tri in buffer.iter() {
    for p in [tri.a, tri.b, tri.c] {
      // Chunk-local y of every crossing: t = 0.25 up the first cell edge.
      assert!((p.y - 0.25).abs() < 1e-5, "crossing at local y {}", p.y);
    }
  }
}

#[test]
fn shared_cell_faces_weld_bit_exactly() {
  let table = KernelTable::default();
  let shapes = vec![ShapeDescriptor::sphere(Affine3A::from_scale(Vec3::splat(
    2.5,
  )))];
  let (buffer, _) = mesh_shapes(
    &shapes,
    &table,
    IVec3::splat(6),
    0.5,
    Vec3::splat(-1.5),
    false,
  );

  // Watertightness across cell boundaries is only possible if shared
  // crossings reproduce identical bits; an open edge would show up as a
  // count of 1.
  let histogram = edge_histogram(buffer.iter().copied());
  assert!(histogram.values().all(|&uses| uses == 2));
}
