//! Engine-agnostic generation metrics.
//!
//! Feature-gated and runtime-toggled to keep zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use tetramesh::metrics::{GenerationMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // The scheduler records per-chunk stats automatically; read them out:
//! let avg = scheduler.metrics.average_chunk_us();
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::types::GenerationStats;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  /// Create a new rolling window with the given capacity.
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Iterate over values (oldest to newest).
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  /// Get the most recent value.
  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

/// Window length used for per-chunk histories.
const HISTORY: usize = 120;

/// Rolling generation statistics maintained by the scheduler.
#[derive(Debug, Clone)]
pub struct GenerationMetrics {
  /// Total per-chunk generation time (field + mesh + weld), microseconds.
  pub chunk_times_us: RollingWindow<u64>,
  /// Triangle counts per generated chunk.
  pub triangle_counts: RollingWindow<usize>,
  /// Currently resident chunk count.
  pub resident_chunks: usize,
}

impl Default for GenerationMetrics {
  fn default() -> Self {
    Self::new()
  }
}

impl GenerationMetrics {
  pub fn new() -> Self {
    Self {
      chunk_times_us: RollingWindow::new(HISTORY),
      triangle_counts: RollingWindow::new(HISTORY),
      resident_chunks: 0,
    }
  }

  /// Record one chunk generation.
  pub fn record_chunk(&mut self, stats: &GenerationStats) {
    self
      .chunk_times_us
      .push(stats.field_us + stats.mesh_us + stats.weld_us);
    self.triangle_counts.push(stats.triangle_count);
  }

  pub fn set_resident_chunks(&mut self, count: usize) {
    self.resident_chunks = count;
  }

  /// Mean chunk generation time over the window, microseconds.
  pub fn average_chunk_us(&self) -> u64 {
    if self.chunk_times_us.is_empty() {
      return 0;
    }
    let sum: u64 = self.chunk_times_us.iter().sum();
    sum / self.chunk_times_us.len() as u64
  }

  pub fn clear(&mut self) {
    self.chunk_times_us.clear();
    self.triangle_counts.clear();
    self.resident_chunks = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rolling_window_evicts_oldest() {
    let mut window = RollingWindow::new(3);
    for i in 0..5u64 {
      window.push(i);
    }
    assert_eq!(window.len(), 3);
    let values: Vec<_> = window.iter().copied().collect();
    assert_eq!(values, vec![2, 3, 4]);
    assert_eq!(window.last(), Some(&4));
  }

  #[test]
  fn average_over_recorded_chunks() {
    let mut metrics = GenerationMetrics::new();
    assert_eq!(metrics.average_chunk_us(), 0);

    metrics.record_chunk(&GenerationStats {
      field_us: 100,
      mesh_us: 50,
      weld_us: 50,
      triangle_count: 10,
    });
    metrics.record_chunk(&GenerationStats {
      field_us: 200,
      mesh_us: 100,
      weld_us: 100,
      triangle_count: 30,
    });

    assert_eq!(metrics.average_chunk_us(), 300);
    assert_eq!(metrics.triangle_counts.last(), Some(&30));
  }
}
