use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3, Vec3A};

use super::*;
use crate::blend::BlendMode;

/// Sphere of world radius `r` at the origin: unit sphere scaled by 2r.
fn sphere_of_radius(r: f32) -> ShapeDescriptor {
  ShapeDescriptor::sphere(Affine3A::from_scale(Vec3::splat(2.0 * r)))
}

#[test]
fn sphere_sign_consistency() {
  let r = 1.5;
  let shape = sphere_of_radius(r);
  let kernel = SphereKernel;

  // On the surface: zero within epsilon.
  let on_surface = kernel.distance(&shape, Vec3A::new(r, 0.0, 0.0));
  assert!(on_surface.abs() < 1e-4, "surface distance {on_surface}");

  // At the center: -r.
  let at_center = kernel.distance(&shape, Vec3A::ZERO);
  assert!((at_center + r).abs() < 1e-4, "center distance {at_center}");

  // At twice the radius: +r.
  let outside = kernel.distance(&shape, Vec3A::new(2.0 * r, 0.0, 0.0));
  assert!((outside - r).abs() < 1e-4, "outside distance {outside}");
}

#[test]
fn sphere_supports_ellipsoidal_scaling() {
  // Radius 2 along X, radius 1 along Y/Z.
  let shape = ShapeDescriptor::sphere(Affine3A::from_scale(Vec3::new(4.0, 2.0, 2.0)));
  let kernel = SphereKernel;

  assert!(kernel.distance(&shape, Vec3A::new(2.0, 0.0, 0.0)).abs() < 1e-4);
  assert!(kernel.distance(&shape, Vec3A::new(0.0, 1.0, 0.0)).abs() < 1e-4);
  assert!(kernel.distance(&shape, Vec3A::new(0.0, 0.0, 2.0)) > 0.5);
}

#[test]
fn box_distances_inside_and_out() {
  // Unit box scaled by 2: spans [-1, 1]^3.
  let shape = ShapeDescriptor::cuboid(Affine3A::from_scale(Vec3::splat(2.0)));
  let kernel = BoxKernel;

  // Outside a face: distance to the face plane.
  let d = kernel.distance(&shape, Vec3A::new(2.0, 0.0, 0.0));
  assert!((d - 1.0).abs() < 1e-4, "face distance {d}");

  // Outside a corner: euclidean distance to the corner.
  let d = kernel.distance(&shape, Vec3A::new(2.0, 2.0, 2.0));
  assert!((d - 3.0f32.sqrt()).abs() < 1e-4, "corner distance {d}");

  // Inside: negative distance to the nearest face.
  let d = kernel.distance(&shape, Vec3A::new(0.8, 0.0, 0.0));
  assert!((d + 0.2).abs() < 1e-4, "inside distance {d}");

  // Dead center: half extent inward.
  let d = kernel.distance(&shape, Vec3A::ZERO);
  assert!((d + 1.0).abs() < 1e-4, "center distance {d}");
}

#[test]
fn box_rotation_moves_with_the_transform() {
  let rot = Affine3A::from_rotation_z(std::f32::consts::FRAC_PI_4);
  let shape = ShapeDescriptor::cuboid(rot);
  let kernel = BoxKernel;

  // The rotated box's corner now points along +X; the axis-aligned face
  // distance no longer applies.
  let straight = kernel.distance(&shape, Vec3A::new(0.8, 0.0, 0.0));
  let rotated_corner = kernel.distance(
    &shape,
    rot.transform_point3a(Vec3A::new(0.5, 0.5, 0.0)),
  );
  assert!(rotated_corner.abs() < 1e-4);
  assert!(straight > 0.0);
}

#[test]
fn evaluated_normals_are_unit_and_outward() {
  let shape = sphere_of_radius(1.0);
  let kernel = SphereKernel;

  for p in [
    Vec3A::new(0.9, 0.2, -0.1),
    Vec3A::new(-0.5, 0.8, 0.3),
    Vec3A::new(0.0, -1.1, 0.0),
  ] {
    let sample = kernel.evaluate(&shape, p);
    assert!((sample.normal.length() - 1.0).abs() < 1e-4);
    let radial = p.normalize();
    assert!(
      sample.normal.dot(radial) > 0.95,
      "normal {:?} not outward at {p}",
      sample.normal
    );
  }
}

#[test]
fn bevel_radius_inflates_the_shape() {
  let shape = sphere_of_radius(1.0);
  let beveled = shape.with_bevel_radius(0.25);
  let kernel = SphereKernel;

  let p = Vec3A::new(2.0, 0.0, 0.0);
  let plain = kernel.evaluate(&shape, p).distance;
  let inflated = kernel.evaluate(&beveled, p).distance;
  assert!((plain - inflated - 0.25).abs() < 1e-4);
}

#[test]
fn terrain_splits_above_and_below() {
  let shape = ShapeDescriptor::terrain(Affine3A::IDENTITY);
  let kernel = TerrainKernel::new(7);

  // The octave stack is bounded by amplitude * (1 + gain + gain² + ...),
  // well under 50 with defaults.
  assert!(kernel.distance(&shape, Vec3A::new(3.0, 50.0, -8.0)) > 0.0);
  assert!(kernel.distance(&shape, Vec3A::new(3.0, -50.0, -8.0)) < 0.0);
}

#[test]
fn terrain_is_deterministic_per_seed() {
  let shape = ShapeDescriptor::terrain(Affine3A::IDENTITY);
  let a = TerrainKernel::new(11);
  let b = TerrainKernel::new(11);
  let c = TerrainKernel::new(12);

  let p = Vec3A::new(4.2, 0.5, -9.1);
  assert_eq!(a.distance(&shape, p), b.distance(&shape, p));
  assert_ne!(a.distance(&shape, p), c.distance(&shape, p));
}

#[test]
fn descriptor_transform_pair_stays_inverse() {
  let transform = Affine3A::from_scale_rotation_translation(
    Vec3::new(2.0, 1.0, 3.0),
    Quat::from_rotation_y(0.7),
    Vec3::new(5.0, -2.0, 1.0),
  );
  let shape = ShapeDescriptor::sphere(transform);

  let p = Vec3A::new(1.0, 2.0, 3.0);
  let roundtrip = shape
    .local_to_world
    .transform_point3a(shape.world_to_local.transform_point3a(p));
  assert!((roundtrip - p).length() < 1e-4);
}

#[test]
fn resolve_filters_inactive_and_unknown() {
  let table = KernelTable::default();
  let shapes = vec![
    sphere_of_radius(1.0),
    sphere_of_radius(2.0).with_active(false),
    ShapeDescriptor::new(ShapeKind::Custom(9), Affine3A::IDENTITY),
    ShapeDescriptor::cuboid(Affine3A::IDENTITY),
  ];

  let resolved = table.resolve(&shapes);
  assert_eq!(resolved.len(), 2);
  assert_eq!(resolved[0].shape.kind, ShapeKind::Sphere);
  assert_eq!(resolved[1].shape.kind, ShapeKind::Box);
}

#[test]
fn custom_kernels_resolve_once_registered() {
  struct HalfSpace;
  impl ShapeKernel for HalfSpace {
    fn distance(&self, shape: &ShapeDescriptor, world: Vec3A) -> f32 {
      shape.world_to_local.transform_point3a(world).y
    }
  }

  let mut table = KernelTable::default();
  table.register_shape(ShapeKind::Custom(3), Arc::new(HalfSpace));

  let shapes = vec![ShapeDescriptor::new(ShapeKind::Custom(3), Affine3A::IDENTITY)
    .with_blend(BlendMode::Union, 0.0)];
  let resolved = table.resolve(&shapes);
  assert_eq!(resolved.len(), 1);
  assert_eq!(
    resolved[0]
      .kernel
      .distance(resolved[0].shape, Vec3A::new(0.0, -2.5, 0.0)),
    -2.5
  );
}
