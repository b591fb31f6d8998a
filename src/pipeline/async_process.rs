//! Non-blocking chunk generation.
//!
//! Wraps [`generate_chunk`] to run on rayon's thread pool without blocking
//! the caller, delivering results over a bounded channel.
//!
//! # Usage
//!
//! ```ignore
//! let mut pipeline = AsyncChunkPipeline::new();
//!
//! // Start generating (non-blocking)
//! pipeline.start(key, shapes, config, table);
//!
//! // Poll each frame
//! if let Some(Ok((meshes, stats))) = pipeline.poll() {
//!     // Hand meshes to the consumer
//! }
//! ```

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::shapes::{KernelTable, ShapeDescriptor};
use crate::types::{GenerateConfig, GenerationStats};

use super::process::generate_chunk;
use super::types::{ChunkKey, ChunkMeshes, ChunkStorage, PipelineError};

type CompletionMessage = (
  ChunkStorage,
  Result<(ChunkMeshes, GenerationStats), PipelineError>,
);

/// Non-blocking wrapper around [`generate_chunk`].
///
/// One chunk in flight at a time; storage rides along with the result so it
/// can be recycled for the next request. Cancelling drops the channel, which
/// releases the in-flight storage with it — no partial results survive an
/// aborted pass.
#[derive(Default)]
pub struct AsyncChunkPipeline {
  pending: Option<Receiver<CompletionMessage>>,
  spare_storage: Vec<ChunkStorage>,
}

impl AsyncChunkPipeline {
  pub fn new() -> Self {
    Self::default()
  }

  /// True while a chunk is generating.
  pub fn is_busy(&self) -> bool {
    self.pending.is_some()
  }

  /// Start generating a chunk (non-blocking).
  ///
  /// Returns `false` if a chunk is already in flight.
  pub fn start(
    &mut self,
    key: ChunkKey,
    shapes: Vec<ShapeDescriptor>,
    config: GenerateConfig,
    table: Arc<KernelTable>,
  ) -> bool {
    if self.is_busy() {
      return false;
    }

    let mut storage = self.spare_storage.pop().unwrap_or_default();
    let (tx, rx) = bounded(1);

    rayon::spawn(move || {
      let result = generate_chunk(key, &shapes, &config, &table, &mut storage);
      // Receiver may have been cancelled; the storage drops with the send.
      let _ = tx.send((storage, result));
    });

    self.pending = Some(rx);
    true
  }

  /// Poll for completion (non-blocking).
  ///
  /// Returns `Some` once the in-flight chunk finishes, `None` while it is
  /// still running or when nothing was started.
  pub fn poll(&mut self) -> Option<Result<(ChunkMeshes, GenerationStats), PipelineError>> {
    let rx = self.pending.as_ref()?;
    match rx.try_recv() {
      Ok((storage, result)) => {
        self.spare_storage.push(storage);
        self.pending = None;
        Some(result)
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        self.pending = None;
        None
      }
    }
  }

  /// Discard any in-flight result.
  ///
  /// The worker still runs to completion, but its output and storage are
  /// dropped when it sends into the disconnected channel.
  pub fn cancel(&mut self) {
    self.pending = None;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::{Affine3A, IVec3, Vec3};
  use crate::shapes::ShapeDescriptor;
  use crate::types::GenerateConfig;

  fn unit_sphere() -> Vec<ShapeDescriptor> {
    vec![ShapeDescriptor::sphere(Affine3A::from_scale(Vec3::splat(
      4.0,
    )))]
  }

  fn small_config() -> GenerateConfig {
    GenerateConfig::new()
      .with_cell_count(IVec3::splat(8))
      .with_cell_scale(Vec3::splat(0.5))
      .with_transform(Affine3A::from_translation(Vec3::splat(-2.0)))
  }

  #[test]
  fn start_poll_roundtrip() {
    let mut pipeline = AsyncChunkPipeline::new();
    let table = Arc::new(KernelTable::default());

    assert!(pipeline.start(IVec3::ZERO, unit_sphere(), small_config(), table));
    assert!(pipeline.is_busy());

    let mut result = None;
    for _ in 0..5000 {
      if let Some(r) = pipeline.poll() {
        result = Some(r);
        break;
      }
      std::thread::sleep(std::time::Duration::from_millis(1));
    }

    let (meshes, stats) = result.expect("pipeline should complete").unwrap();
    assert!(!meshes.is_empty());
    assert!(stats.triangle_count > 0);
    assert!(!pipeline.is_busy());
  }

  #[test]
  fn rejects_second_start_while_busy() {
    let mut pipeline = AsyncChunkPipeline::new();
    let table = Arc::new(KernelTable::default());

    assert!(pipeline.start(
      IVec3::ZERO,
      unit_sphere(),
      small_config(),
      table.clone()
    ));
    assert!(!pipeline.start(IVec3::ONE, unit_sphere(), small_config(), table));

    // Drain so the worker's send does not outlive the test harness.
    while pipeline.poll().is_none() {
      std::thread::sleep(std::time::Duration::from_millis(1));
    }
  }

  #[test]
  fn cancel_discards_result() {
    let mut pipeline = AsyncChunkPipeline::new();
    let table = Arc::new(KernelTable::default());

    assert!(pipeline.start(IVec3::ZERO, unit_sphere(), small_config(), table));
    pipeline.cancel();
    assert!(!pipeline.is_busy());
    assert!(pipeline.poll().is_none());
  }
}
