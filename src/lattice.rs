//! Chunk field lattice: sampling arena plus the shape-fold builder.
//!
//! Point positions are computed once per chunk geometry (they depend only on
//! cell dimensions and scale) and cached across generations; field values and
//! normals are reset each pass. Folding the shape list is a strict
//! left-to-right reduction — only the per-point work inside one shape pass
//! runs in parallel, because shape `i+1` reads the accumulator shape `i`
//! wrote.

use glam::{Affine3A, Mat3A, Vec3, Vec3A};
use rayon::prelude::*;

use crate::blend::{normalize_or_up, FieldSample};
use crate::constants::LatticeDims;
use crate::pipeline::PipelineError;
use crate::shapes::ResolvedShape;

/// One lattice sample point.
#[derive(Clone, Copy, Debug)]
pub struct FieldPoint {
  /// Chunk-local position, cached once per chunk geometry.
  pub position: Vec3A,
  /// Accumulated signed distance; `+INFINITY` before any shape applies.
  pub value: f32,
  /// Accumulated outward normal.
  pub normal: Vec3A,
}

impl FieldPoint {
  /// -1 inside, 0 exactly on the surface, +1 outside.
  #[inline]
  pub fn sign(&self) -> i8 {
    if self.value < 0.0 {
      -1
    } else if self.value == 0.0 {
      0
    } else {
      1
    }
  }

  /// Inside-the-surface test used for meshing; exact zero counts as outside
  /// so both classifications agree on a consistent boundary.
  #[inline]
  pub fn is_inside(&self) -> bool {
    self.value < 0.0
  }
}

/// Reusable field storage for one chunk.
#[derive(Default)]
pub struct FieldLattice {
  dims: Option<LatticeDims>,
  cell_scale: Vec3,
  points: Vec<FieldPoint>,
}

impl FieldLattice {
  pub fn new() -> Self {
    Self::default()
  }

  /// Size the arena for the given chunk geometry, reusing storage when the
  /// dimensions are unchanged and reallocating (never failing into a
  /// mismatched buffer) when they differ.
  pub fn prepare(&mut self, dims: LatticeDims, cell_scale: Vec3) -> Result<(), PipelineError> {
    if self.dims == Some(dims) && self.cell_scale == cell_scale {
      return Ok(());
    }

    let needed = dims.point_count();
    self.points.clear();
    self
      .points
      .try_reserve(needed)
      .map_err(|_| PipelineError::BufferAlloc {
        bytes: needed * std::mem::size_of::<FieldPoint>(),
      })?;

    let scale = Vec3A::from(cell_scale);
    for index in 0..needed {
      let coord = dims.point_coord(index);
      self.points.push(FieldPoint {
        position: coord.as_vec3a() * scale,
        value: f32::INFINITY,
        normal: Vec3A::Y,
      });
    }

    self.dims = Some(dims);
    self.cell_scale = cell_scale;
    Ok(())
  }

  /// Reset values and normals to the fully-outside state, keeping cached
  /// positions.
  pub fn reset_field(&mut self) {
    for point in &mut self.points {
      point.value = FieldSample::OUTSIDE.distance;
      point.normal = FieldSample::OUTSIDE.normal;
    }
  }

  /// Fold one shape into every lattice point, in parallel.
  pub fn apply_shape(&mut self, resolved: &ResolvedShape<'_>, chunk_to_world: &Affine3A) {
    let shape = resolved.shape;
    let k = shape.blend_factor;
    self.points.par_iter_mut().for_each(|point| {
      let world = chunk_to_world.transform_point3a(point.position);
      let incoming = resolved.kernel.evaluate(shape, world);
      let acc = FieldSample::new(point.value, point.normal);
      let folded = resolved.blend.fold(acc, incoming, k);
      point.value = folded.distance;
      point.normal = folded.normal;
    });
  }

  /// Build the full field: reset, then fold each resolved shape in authoring
  /// order.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "lattice::build")
  )]
  pub fn build(&mut self, resolved: &[ResolvedShape<'_>], chunk_to_world: &Affine3A) {
    self.reset_field();
    for shape in resolved {
      self.apply_shape(shape, chunk_to_world);
    }
    self.localize_normals(chunk_to_world.matrix3);
  }

  /// Rotate world-space normals into the chunk frame so positions and
  /// normals share one coordinate system. No-op for translation-only grids.
  fn localize_normals(&mut self, world_from_local: Mat3A) {
    if world_from_local == Mat3A::IDENTITY {
      return;
    }
    let into_local = world_from_local.transpose();
    self.points.par_iter_mut().for_each(|point| {
      point.normal = normalize_or_up(into_local * point.normal);
    });
  }

  /// True when every point lies on the same side of the surface; such a
  /// chunk carries no geometry and skips meshing.
  pub fn is_homogeneous(&self) -> bool {
    let Some(first) = self.points.first() else {
      return true;
    };
    let inside = first.is_inside();
    self.points.iter().all(|p| p.is_inside() == inside)
  }

  /// Prepared dimensions, if any.
  pub fn dims(&self) -> Option<LatticeDims> {
    self.dims
  }

  pub fn points(&self) -> &[FieldPoint] {
    &self.points
  }

  /// Point at lattice coordinates. Panics if out of bounds or unprepared.
  #[inline]
  pub fn point(&self, x: i32, y: i32, z: i32) -> &FieldPoint {
    let dims = self.dims.expect("lattice not prepared");
    &self.points[dims.point_index(x, y, z)]
  }
}

#[cfg(test)]
#[path = "lattice_test.rs"]
mod lattice_test;
