//! Field blend operators.
//!
//! Each operator folds an incoming shape sample into the running accumulator:
//! a strict left-to-right reduction over the authored shape list. Union and
//! Intersect commute; Subtraction, Lerp, and Repel do not, so shape order is
//! part of the authored result.
//!
//! Distances combine per operator; normals select or interpolate with the
//! same mixing weight the distance used.

use glam::Vec3A;

/// One (distance, normal) field sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSample {
  pub distance: f32,
  pub normal: Vec3A,
}

impl FieldSample {
  /// Accumulator start value: a point fully outside any shape.
  pub const OUTSIDE: FieldSample = FieldSample {
    distance: f32::INFINITY,
    normal: Vec3A::Y,
  };

  pub fn new(distance: f32, normal: Vec3A) -> Self {
    Self { distance, normal }
  }
}

/// How a shape folds into the accumulated field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
  /// `min(dA, dB)` — add the shape.
  Union,
  /// `max(dA, -dB)` — carve the shape out.
  Subtraction,
  /// `max(dA, dB)` — keep the overlap.
  Intersect,
  /// Cubic-polynomial smooth minimum with radius `k`.
  Smooth,
  /// Quadratic interpolation-based smooth union with radius `k`.
  SmoothUnion,
  /// Reflected smooth union: pushes the fields apart near contact.
  Repel,
  /// Straight interpolation between the fields by `k`.
  Lerp,
  /// User-registered operator, dispatched through the kernel table.
  Custom(u16),
}

/// Blend operator implementation, resolved once from the kernel table.
pub trait BlendKernel: Send + Sync {
  /// Fold `incoming` into the accumulator with blend factor `k`.
  fn fold(&self, acc: FieldSample, incoming: FieldSample, k: f32) -> FieldSample;
}

/// Kernel wrapper for the built-in operators.
pub struct BuiltinBlend(pub BlendMode);

impl BlendKernel for BuiltinBlend {
  fn fold(&self, acc: FieldSample, incoming: FieldSample, k: f32) -> FieldSample {
    fold_builtin(self.0, acc, incoming, k)
  }
}

/// Apply a built-in operator. `Custom` modes resolve through the kernel
/// table instead and leave the accumulator unchanged here.
pub fn fold_builtin(mode: BlendMode, a: FieldSample, b: FieldSample, k: f32) -> FieldSample {
  match mode {
    BlendMode::Union => union(a, b),
    BlendMode::Subtraction => subtraction(a, b),
    BlendMode::Intersect => intersect(a, b),
    BlendMode::Smooth => smooth(a, b, k),
    BlendMode::SmoothUnion => smooth_union(a, b, k),
    BlendMode::Repel => repel(a, b, k),
    BlendMode::Lerp => lerp_blend(a, b, k),
    BlendMode::Custom(_) => a,
  }
}

#[inline]
pub(crate) fn union(a: FieldSample, b: FieldSample) -> FieldSample {
  if b.distance < a.distance {
    b
  } else {
    a
  }
}

#[inline]
pub(crate) fn subtraction(a: FieldSample, b: FieldSample) -> FieldSample {
  let carved = -b.distance;
  if carved > a.distance {
    FieldSample::new(carved, -b.normal)
  } else {
    a
  }
}

#[inline]
pub(crate) fn intersect(a: FieldSample, b: FieldSample) -> FieldSample {
  if b.distance > a.distance {
    b
  } else {
    a
  }
}

/// Cubic smooth minimum: `min(dA, dB) - h³k/6` with
/// `h = clamp(k - |dA - dB|, 0, k) / k`.
#[inline]
pub(crate) fn smooth(a: FieldSample, b: FieldSample, k: f32) -> FieldSample {
  if k <= 0.0 {
    return union(a, b);
  }
  let h = (k - (a.distance - b.distance).abs()).clamp(0.0, k) / k;
  let distance = a.distance.min(b.distance) - h * h * h * k * (1.0 / 6.0);
  FieldSample::new(distance, mix_normals(a, b, k))
}

/// Quadratic smooth union: `lerp(dB, dA, h) - k·h·(1-h)` with
/// `h = clamp(0.5 + 0.5(dB - dA)/k, 0, 1)`.
#[inline]
pub(crate) fn smooth_union(a: FieldSample, b: FieldSample, k: f32) -> FieldSample {
  if k <= 0.0 {
    return union(a, b);
  }
  let h = (0.5 + 0.5 * (b.distance - a.distance) / k).clamp(0.0, 1.0);
  let distance = b.distance + (a.distance - b.distance) * h - k * h * (1.0 - h);
  FieldSample::new(distance, nlerp(b.normal, a.normal, h))
}

/// `2·min(dA, dB) - SmoothUnion(dA, dB, k)`: the smooth fillet mirrored to
/// the other side of the hard minimum.
#[inline]
pub(crate) fn repel(a: FieldSample, b: FieldSample, k: f32) -> FieldSample {
  if k <= 0.0 {
    return union(a, b);
  }
  let su = smooth_union(a, b, k);
  let distance = 2.0 * a.distance.min(b.distance) - su.distance;
  let normal = if b.distance < a.distance { b.normal } else { a.normal };
  FieldSample::new(distance, normal)
}

#[inline]
pub(crate) fn lerp_blend(a: FieldSample, b: FieldSample, k: f32) -> FieldSample {
  // Lerping from the empty accumulator is the incoming field.
  if !a.distance.is_finite() {
    return b;
  }
  let distance = a.distance + (b.distance - a.distance) * k;
  FieldSample::new(distance, nlerp(a.normal, b.normal, k))
}

/// Interpolate normals with the quadratic mixing weight, so the normal field
/// transitions over the same band the smoothed distance does.
#[inline]
fn mix_normals(a: FieldSample, b: FieldSample, k: f32) -> Vec3A {
  let h = (0.5 + 0.5 * (b.distance - a.distance) / k).clamp(0.0, 1.0);
  nlerp(b.normal, a.normal, h)
}

/// Lerp and renormalize, falling back to up for vanishing vectors.
#[inline]
pub(crate) fn nlerp(from: Vec3A, to: Vec3A, t: f32) -> Vec3A {
  normalize_or_up(from + (to - from) * t)
}

/// Normalize, falling back to up for vanishing vectors.
#[inline]
pub(crate) fn normalize_or_up(v: Vec3A) -> Vec3A {
  let len_sq = v.length_squared();
  if len_sq < 1e-12 {
    Vec3A::Y
  } else {
    v * len_sq.sqrt().recip()
  }
}

#[cfg(test)]
#[path = "blend_test.rs"]
mod blend_test;
