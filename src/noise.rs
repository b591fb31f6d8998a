//! Deterministic 3D value noise.
//!
//! Integer-hash lattice noise with quintic-smoothed trilinear interpolation.
//! Fully deterministic for a given seed across runs and platforms, which
//! keeps terrain fields reproducible between chunks and test runs.

use glam::Vec3A;

/// Mix lattice coordinates and seed into a uniform u32.
#[inline(always)]
pub(crate) fn hash3(x: i32, y: i32, z: i32, seed: u32) -> u32 {
  let mut h = seed
    ^ (x as u32).wrapping_mul(0x9E37_79B9)
    ^ (y as u32).wrapping_mul(0x85EB_CA6B)
    ^ (z as u32).wrapping_mul(0xC2B2_AE35);
  h ^= h >> 16;
  h = h.wrapping_mul(0x7FEB_352D);
  h ^= h >> 15;
  h = h.wrapping_mul(0x846C_A68B);
  h ^= h >> 16;
  h
}

/// Lattice value in [-1, 1].
#[inline(always)]
fn lattice_value(x: i32, y: i32, z: i32, seed: u32) -> f32 {
  hash3(x, y, z, seed) as f32 * (2.0 / u32::MAX as f32) - 1.0
}

/// Quintic fade curve, zero first and second derivative at 0 and 1.
#[inline(always)]
fn fade(t: f32) -> f32 {
  t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Seeded 3D value noise source.
#[derive(Clone, Copy, Debug)]
pub struct ValueNoise {
  seed: u32,
}

impl ValueNoise {
  pub fn new(seed: u32) -> Self {
    Self { seed }
  }

  /// Scalar noise in [-1, 1].
  pub fn sample(&self, p: Vec3A) -> f32 {
    self.sample_seeded(p, self.seed)
  }

  /// Vector noise in [-1, 1]³, three decorrelated channels.
  pub fn sample_vec3(&self, p: Vec3A) -> Vec3A {
    Vec3A::new(
      self.sample_seeded(p, self.seed.wrapping_add(0x5155_9F3F)),
      self.sample_seeded(p, self.seed.wrapping_add(0xA3D9_4B61)),
      self.sample_seeded(p, self.seed.wrapping_add(0x1B56_C4E9)),
    )
  }

  fn sample_seeded(&self, p: Vec3A, seed: u32) -> f32 {
    let base = p.floor();
    let cell = base.as_ivec3();
    let f = p - base;

    let u = fade(f.x);
    let v = fade(f.y);
    let w = fade(f.z);

    let corner = |dx: i32, dy: i32, dz: i32| {
      lattice_value(cell.x + dx, cell.y + dy, cell.z + dz, seed)
    };

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);

    let y0 = lerp(x00, x10, v);
    let y1 = lerp(x01, x11, v);

    lerp(y0, y1, w)
  }
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
  a + (b - a) * t
}
