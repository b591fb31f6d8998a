use glam::{Affine3A, IVec3, Vec3, Vec3A};

use super::*;

#[test]
fn empty_aabb_is_invalid_until_encapsulation() {
  let mut aabb = MinMaxAABB::empty();
  assert!(!aabb.is_valid());

  aabb.encapsulate([1.0, 2.0, 3.0]);
  assert!(aabb.is_valid());
  assert_eq!(aabb.min, [1.0, 2.0, 3.0]);
  assert_eq!(aabb.max, [1.0, 2.0, 3.0]);

  aabb.encapsulate([-1.0, 5.0, 0.0]);
  assert_eq!(aabb.min, [-1.0, 2.0, 0.0]);
  assert_eq!(aabb.max, [1.0, 5.0, 3.0]);
}

#[test]
fn degenerate_triangle_detection() {
  let mut tri = Triangle::default();
  assert!(tri.is_degenerate());

  tri.a = Vec3A::new(0.0, 0.0, 0.0);
  tri.b = Vec3A::new(1.0, 0.0, 0.0);
  tri.c = Vec3A::new(0.0, 1.0, 0.0);
  assert!(!tri.is_degenerate());

  tri.c = tri.a;
  assert!(tri.is_degenerate());
}

#[test]
fn config_clamps_malformed_values() {
  let config = GenerateConfig::new()
    .with_cell_count(IVec3::new(-3, 0, 5))
    .with_chunk_count(IVec3::new(0, -1, 2))
    .with_max_vertices_per_mesh(1);

  assert_eq!(config.cell_count, IVec3::new(1, 1, 5));
  assert_eq!(config.chunk_count, IVec3::new(1, 1, 2));
  assert_eq!(config.max_vertices_per_mesh, 3);
}

#[test]
fn chunk_extent_is_cells_times_scale() {
  let config = GenerateConfig::new()
    .with_cell_count(IVec3::new(4, 8, 2))
    .with_cell_scale(Vec3::new(1.0, 0.5, 2.0));
  assert_eq!(config.chunk_extent(), Vec3::new(4.0, 4.0, 4.0));
}

#[test]
fn chunk_to_world_translates_by_chunk_extent() {
  let config = GenerateConfig::new()
    .with_cell_count(IVec3::splat(4))
    .with_cell_scale(Vec3::splat(2.0));

  let m = config.chunk_to_world(IVec3::new(1, 0, -1));
  let origin = m.transform_point3a(Vec3A::ZERO);
  assert_eq!(origin, Vec3A::new(8.0, 0.0, -8.0));
}

#[test]
fn chunk_to_world_applies_grid_frame() {
  let config = GenerateConfig::new()
    .with_cell_count(IVec3::splat(2))
    .with_cell_scale(Vec3::ONE)
    .with_transform(Affine3A::from_translation(Vec3::new(100.0, 0.0, 0.0)));

  let m = config.chunk_to_world(IVec3::new(1, 0, 0));
  assert_eq!(m.transform_point3a(Vec3A::ZERO), Vec3A::new(102.0, 0.0, 0.0));
}

#[test]
fn world_to_chunk_floors_negative_coordinates() {
  let config = GenerateConfig::new()
    .with_cell_count(IVec3::splat(4))
    .with_cell_scale(Vec3::ONE);

  assert_eq!(config.world_to_chunk(Vec3A::new(0.5, 0.5, 0.5)), IVec3::ZERO);
  assert_eq!(
    config.world_to_chunk(Vec3A::new(-0.5, 0.5, 0.5)),
    IVec3::new(-1, 0, 0)
  );
  assert_eq!(
    config.world_to_chunk(Vec3A::new(4.0, -4.1, 8.0)),
    IVec3::new(1, -2, 2)
  );
}

#[test]
fn world_to_chunk_roundtrips_chunk_origin() {
  let config = GenerateConfig::new()
    .with_cell_count(IVec3::splat(8))
    .with_cell_scale(Vec3::splat(0.5))
    .with_transform(Affine3A::from_translation(Vec3::new(-3.0, 7.0, 0.25)));

  for key in [IVec3::ZERO, IVec3::new(2, -1, 3), IVec3::new(-4, 0, -1)] {
    let center = config
      .chunk_to_world(key)
      .transform_point3a(Vec3A::from(config.chunk_extent() * 0.5));
    assert_eq!(config.world_to_chunk(center), key, "chunk {key}");
  }
}
