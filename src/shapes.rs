//! Shape descriptors and distance kernels.
//!
//! Shapes are unit primitives (sphere of diameter 1, box spanning
//! `[-0.5, 0.5]³`, terrain ground plane at y = 0) positioned by their own
//! transform pair. Kernels evaluate world-space signed distance; normals come
//! from four-point tetrahedral differencing of the kernel field.
//!
//! Kind and blend-mode dispatch is resolved once per generation pass through
//! [`KernelTable`], never per lattice point.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Affine3A, Vec3A};

use crate::blend::{normalize_or_up, BlendKernel, BlendMode, BuiltinBlend, FieldSample};
use crate::noise::ValueNoise;

/// Which analytic field a shape samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
  /// Unit sphere (diameter 1); transform scaling makes it an ellipsoid.
  Sphere,
  /// Unit box spanning `[-0.5, 0.5]³`.
  Box,
  /// Noise-perturbed ground plane at local y = 0; solid below.
  Terrain,
  /// User-registered kind, dispatched through the kernel table.
  Custom(u16),
}

/// Immutable snapshot of one authored shape.
///
/// Copied by value into the pipeline for each generation pass. The authoring
/// order of the descriptor list is the blend order.
#[derive(Clone, Copy, Debug)]
pub struct ShapeDescriptor {
  pub kind: ShapeKind,
  pub blend_mode: BlendMode,
  pub blend_factor: f32,
  /// Uniform inflation subtracted from the kernel distance; rounds edges.
  pub bevel_radius: f32,
  /// Inactive shapes are skipped by the lattice builder.
  pub active: bool,
  pub world_to_local: Affine3A,
  pub local_to_world: Affine3A,
}

impl ShapeDescriptor {
  /// Create a shape from its local→world transform; the inverse is computed
  /// once here, not per sample.
  pub fn new(kind: ShapeKind, local_to_world: Affine3A) -> Self {
    Self {
      kind,
      blend_mode: BlendMode::Union,
      blend_factor: 0.0,
      bevel_radius: 0.0,
      active: true,
      world_to_local: local_to_world.inverse(),
      local_to_world,
    }
  }

  pub fn sphere(local_to_world: Affine3A) -> Self {
    Self::new(ShapeKind::Sphere, local_to_world)
  }

  pub fn cuboid(local_to_world: Affine3A) -> Self {
    Self::new(ShapeKind::Box, local_to_world)
  }

  pub fn terrain(local_to_world: Affine3A) -> Self {
    Self::new(ShapeKind::Terrain, local_to_world)
  }

  pub fn with_blend(mut self, mode: BlendMode, factor: f32) -> Self {
    self.blend_mode = mode;
    self.blend_factor = factor;
    self
  }

  pub fn with_bevel_radius(mut self, radius: f32) -> Self {
    self.bevel_radius = radius;
    self
  }

  pub fn with_active(mut self, active: bool) -> Self {
    self.active = active;
    self
  }
}

/// Offset directions for tetrahedral normal estimation: the vertices of a
/// regular tetrahedron. Four field taps instead of six, and no axis-aligned
/// bias from a central-difference stencil.
const TETRA_DIRS: [Vec3A; 4] = [
  Vec3A::new(0.577_350_3, 0.577_350_3, 0.577_350_3),
  Vec3A::new(0.577_350_3, -0.577_350_3, -0.577_350_3),
  Vec3A::new(-0.577_350_3, 0.577_350_3, -0.577_350_3),
  Vec3A::new(-0.577_350_3, -0.577_350_3, 0.577_350_3),
];

/// Step size for normal differencing, in world units.
const NORMAL_EPSILON: f32 = 1e-3;

/// Signed-distance evaluator for one shape kind.
///
/// Implementations work in world space and use the descriptor's transform
/// pair internally, so non-uniform scaling stays correct.
pub trait ShapeKernel: Send + Sync {
  /// Signed distance at a world-space point: positive outside, negative
  /// inside.
  fn distance(&self, shape: &ShapeDescriptor, world: Vec3A) -> f32;

  /// Distance plus outward normal.
  ///
  /// The default estimates the normal with four extra field taps; kernels
  /// with cheap analytic gradients may override.
  fn evaluate(&self, shape: &ShapeDescriptor, world: Vec3A) -> FieldSample {
    let distance = self.distance(shape, world) - shape.bevel_radius;
    // The bevel offset is constant and cancels in the differences.
    let mut grad = Vec3A::ZERO;
    for dir in TETRA_DIRS {
      grad += dir * self.distance(shape, world + dir * NORMAL_EPSILON);
    }
    FieldSample::new(distance, normalize_or_up(grad))
  }
}

/// Unit sphere kernel.
///
/// The radius is recovered from the shape's own transform: the closest
/// surface point along the local radial direction is mapped back to world
/// space, so ellipsoidal scaling keeps a usable (if approximate) distance.
pub struct SphereKernel;

impl ShapeKernel for SphereKernel {
  fn distance(&self, shape: &ShapeDescriptor, world: Vec3A) -> f32 {
    let local = shape.world_to_local.transform_point3a(world);
    let len = local.length();
    let dir = if len > 1e-8 { local / len } else { Vec3A::X };
    let surface = shape.local_to_world.transform_point3a(dir * 0.5);
    let center = shape.local_to_world.transform_point3a(Vec3A::ZERO);
    (world - center).length() - (surface - center).length()
  }
}

/// Unit box kernel.
pub struct BoxKernel;

impl ShapeKernel for BoxKernel {
  fn distance(&self, shape: &ShapeDescriptor, world: Vec3A) -> f32 {
    let local = shape.world_to_local.transform_point3a(world);
    let clamped = local.clamp(Vec3A::splat(-0.5), Vec3A::splat(0.5));

    if local != clamped {
      // Outside: distance to the clamped surface point, in world units.
      return (world - shape.local_to_world.transform_point3a(clamped)).length();
    }

    // Inside: project to the nearest face and negate.
    let to_face = Vec3A::splat(0.5) - local.abs();
    let mut surface = local;
    if to_face.x <= to_face.y && to_face.x <= to_face.z {
      surface.x = 0.5f32.copysign(local.x);
    } else if to_face.y <= to_face.z {
      surface.y = 0.5f32.copysign(local.y);
    } else {
      surface.z = 0.5f32.copysign(local.z);
    }
    -(world - shape.local_to_world.transform_point3a(surface)).length()
  }
}

/// Noise-perturbed ground plane.
///
/// The field is local y plus descending-amplitude octaves of 3D value noise,
/// so slopes can fold into overhangs. The finest octave samples a position
/// offset by the coarsest octave's vector noise (domain warp), which breaks
/// up the grid-aligned look of plain value noise.
#[derive(Clone)]
pub struct TerrainKernel {
  noise: ValueNoise,
  pub octaves: u32,
  /// Base (coarsest) noise frequency; smaller = larger features.
  pub frequency: f32,
  /// Amplitude of the coarsest octave, in local units.
  pub amplitude: f32,
  pub lacunarity: f32,
  pub gain: f32,
  /// Domain-warp offset strength, in local units.
  pub warp: f32,
}

impl Default for TerrainKernel {
  fn default() -> Self {
    Self::new(1337)
  }
}

impl TerrainKernel {
  pub fn new(seed: u32) -> Self {
    Self {
      noise: ValueNoise::new(seed),
      octaves: 4,
      frequency: 0.05,
      amplitude: 6.0,
      lacunarity: 2.0,
      gain: 0.5,
      warp: 4.0,
    }
  }

  pub fn with_octaves(mut self, octaves: u32) -> Self {
    self.octaves = octaves.max(1);
    self
  }

  pub fn with_frequency(mut self, frequency: f32) -> Self {
    self.frequency = frequency;
    self
  }

  pub fn with_amplitude(mut self, amplitude: f32) -> Self {
    self.amplitude = amplitude;
    self
  }

  pub fn with_warp(mut self, warp: f32) -> Self {
    self.warp = warp;
    self
  }
}

impl ShapeKernel for TerrainKernel {
  fn distance(&self, shape: &ShapeDescriptor, world: Vec3A) -> f32 {
    let local = shape.world_to_local.transform_point3a(world);
    let warp = self.noise.sample_vec3(local * self.frequency) * self.warp;

    let mut distance = local.y;
    let mut frequency = self.frequency;
    let mut amplitude = self.amplitude;
    for octave in 0..self.octaves {
      let p = if octave + 1 == self.octaves {
        local + warp
      } else {
        local
      };
      distance += self.noise.sample(p * frequency) * amplitude;
      frequency *= self.lacunarity;
      amplitude *= self.gain;
    }
    distance
  }
}

/// Shape paired with its resolved kernels for one generation pass.
pub struct ResolvedShape<'a> {
  pub shape: &'a ShapeDescriptor,
  pub kernel: Arc<dyn ShapeKernel>,
  pub blend: Arc<dyn BlendKernel>,
}

/// Dispatch table from shape kinds and blend modes to implementations.
///
/// Built once at configuration load; `Custom` entries extend the built-in
/// set. Shapes whose kind or blend mode has no registered kernel are dropped
/// at resolve time.
pub struct KernelTable {
  shapes: HashMap<ShapeKind, Arc<dyn ShapeKernel>>,
  blends: HashMap<BlendMode, Arc<dyn BlendKernel>>,
}

impl Default for KernelTable {
  fn default() -> Self {
    let mut table = Self {
      shapes: HashMap::new(),
      blends: HashMap::new(),
    };
    table.register_shape(ShapeKind::Sphere, Arc::new(SphereKernel));
    table.register_shape(ShapeKind::Box, Arc::new(BoxKernel));
    table.register_shape(ShapeKind::Terrain, Arc::new(TerrainKernel::default()));
    for mode in [
      BlendMode::Union,
      BlendMode::Subtraction,
      BlendMode::Intersect,
      BlendMode::Smooth,
      BlendMode::SmoothUnion,
      BlendMode::Repel,
      BlendMode::Lerp,
    ] {
      table.register_blend(mode, Arc::new(BuiltinBlend(mode)));
    }
    table
  }
}

impl KernelTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register (or replace) the kernel for a shape kind.
  pub fn register_shape(&mut self, kind: ShapeKind, kernel: Arc<dyn ShapeKernel>) {
    self.shapes.insert(kind, kernel);
  }

  /// Register (or replace) the kernel for a blend mode.
  pub fn register_blend(&mut self, mode: BlendMode, kernel: Arc<dyn BlendKernel>) {
    self.blends.insert(mode, kernel);
  }

  pub fn shape_kernel(&self, kind: ShapeKind) -> Option<&Arc<dyn ShapeKernel>> {
    self.shapes.get(&kind)
  }

  pub fn blend_kernel(&self, mode: BlendMode) -> Option<&Arc<dyn BlendKernel>> {
    self.blends.get(&mode)
  }

  /// Resolve kernels for the active shapes, preserving authoring order.
  pub fn resolve<'a>(&self, shapes: &'a [ShapeDescriptor]) -> Vec<ResolvedShape<'a>> {
    shapes
      .iter()
      .filter(|shape| shape.active)
      .filter_map(|shape| {
        let kernel = self.shapes.get(&shape.kind)?.clone();
        let blend = self.blends.get(&shape.blend_mode)?.clone();
        Some(ResolvedShape {
          shape,
          kernel,
          blend,
        })
      })
      .collect()
  }
}

#[cfg(test)]
#[path = "shapes_test.rs"]
mod shapes_test;
