//! Chunk scheduler: bounded residency around a moving reference point.
//!
//! Explicit lifecycle instead of engine callbacks:
//!
//! ```text
//! Ready ──start()──► Generating ──end()──► Closed
//!                       │  ▲
//!                       └──┘ step()
//! ```
//!
//! `start` allocates pipeline storage and, in streaming mode, precomputes the
//! distance-sorted visitation order of chunk offsets around the grid center.
//! `step` performs at most one load and one evict per call in streaming mode,
//! or regenerates the whole grid in realtime mode. `end` retires all
//! submitted meshes and releases every buffer; callers invoke it on all exit
//! paths.

use std::collections::HashMap;

use glam::{IVec3, Vec3A};

use crate::noise::hash3;
use crate::pipeline::{
  generate_chunk, ChunkKey, ChunkMeshes, ChunkStorage, MeshConsumer, PipelineError,
};
use crate::shapes::{KernelTable, ShapeDescriptor};
use crate::types::{GenerateConfig, GenerateMode};

#[cfg(feature = "metrics")]
use crate::metrics::GenerationMetrics;

/// Scheduler lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
  /// Constructed, not yet started.
  Ready,
  /// Between `start()` and `end()`; `step()` does work.
  Generating,
  /// After `end()`; all buffers released. `start()` revives the scheduler.
  Closed,
}

/// What one `step()` did.
#[derive(Debug, Default)]
pub struct StepReport {
  /// Chunks generated this step (at most one in streaming mode).
  pub loaded: Vec<ChunkKey>,
  /// Chunk evicted this step, if any.
  pub evicted: Option<ChunkKey>,
}

/// Resident chunk bookkeeping: recycled storage plus whether the consumer
/// currently holds a mesh for this slot.
struct ChunkRecord {
  storage: ChunkStorage,
  has_mesh: bool,
}

/// Keeps a bounded set of generated chunks near the reference point.
pub struct ChunkScheduler {
  config: GenerateConfig,
  table: KernelTable,
  state: SchedulerState,
  records: HashMap<ChunkKey, ChunkRecord>,
  /// Relative chunk offsets in visitation order (streaming mode).
  visit_order: Vec<IVec3>,
  /// Next offset to consider loading.
  cursor: usize,
  /// Reference chunk of the previous step; a change resets the cursor.
  last_reference: Option<IVec3>,
  /// Recycled storage not currently attached to a record.
  spare_storage: Vec<ChunkStorage>,
  #[cfg(feature = "metrics")]
  pub metrics: GenerationMetrics,
}

impl ChunkScheduler {
  pub fn new(config: GenerateConfig, table: KernelTable) -> Self {
    Self {
      config,
      table,
      state: SchedulerState::Ready,
      records: HashMap::new(),
      visit_order: Vec::new(),
      cursor: 0,
      last_reference: None,
      spare_storage: Vec::new(),
      #[cfg(feature = "metrics")]
      metrics: GenerationMetrics::new(),
    }
  }

  pub fn state(&self) -> SchedulerState {
    self.state
  }

  pub fn config(&self) -> &GenerateConfig {
    &self.config
  }

  /// Total chunks the scheduler may keep resident.
  pub fn chunk_budget(&self) -> usize {
    let c = self.config.chunk_count;
    c.x as usize * c.y as usize * c.z as usize
  }

  pub fn resident_count(&self) -> usize {
    self.records.len()
  }

  pub fn is_resident(&self, key: ChunkKey) -> bool {
    self.records.contains_key(&key)
  }

  pub fn resident_keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
    self.records.keys().copied()
  }

  /// Begin a generation session: clear any previous records, allocate
  /// pipeline storage, and precompute the streaming visitation order.
  pub fn start(&mut self) -> Result<(), PipelineError> {
    self.records.clear();
    self.spare_storage.clear();
    self.cursor = 0;
    self.last_reference = None;

    // Warm one storage set so the first step does not pay the allocation.
    let mut storage = ChunkStorage::new();
    let dims = crate::constants::LatticeDims::new(self.config.cell_count);
    storage.lattice.prepare(dims, self.config.cell_scale)?;
    storage.triangles.prepare(dims.cell_count())?;
    self.spare_storage.push(storage);

    self.visit_order = match self.config.mode {
      GenerateMode::Streaming => visitation_order(self.config.chunk_count),
      GenerateMode::Realtime => Vec::new(),
    };

    self.state = SchedulerState::Generating;
    Ok(())
  }

  /// Advance one scheduling tick.
  ///
  /// `reference_world` is the follow target's world-space position, queried
  /// once per step by the caller. No-op unless the scheduler is generating.
  pub fn step(
    &mut self,
    reference_world: Vec3A,
    shapes: &[ShapeDescriptor],
    consumer: &mut dyn MeshConsumer,
  ) -> Result<StepReport, PipelineError> {
    if self.state != SchedulerState::Generating {
      return Ok(StepReport::default());
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("scheduler_step").entered();

    let report = match self.config.mode {
      GenerateMode::Realtime => self.step_realtime(shapes, consumer),
      GenerateMode::Streaming => self.step_streaming(reference_world, shapes, consumer),
    };

    #[cfg(feature = "metrics")]
    if crate::metrics::is_enabled() {
      self.metrics.set_resident_chunks(self.records.len());
    }

    report
  }

  /// End the session: retire everything the consumer holds and release all
  /// lattice, triangle, and shape buffers.
  pub fn end(&mut self, consumer: &mut dyn MeshConsumer) {
    for (key, record) in self.records.drain() {
      if record.has_mesh {
        consumer.retire(key);
      }
    }
    self.spare_storage.clear();
    self.visit_order = Vec::new();
    self.cursor = 0;
    self.last_reference = None;
    self.state = SchedulerState::Closed;
  }

  /// Realtime mode: regenerate every chunk of the grid, no eviction.
  fn step_realtime(
    &mut self,
    shapes: &[ShapeDescriptor],
    consumer: &mut dyn MeshConsumer,
  ) -> Result<StepReport, PipelineError> {
    let mut report = StepReport::default();
    let min = window_min(IVec3::ZERO, self.config.chunk_count);
    let count = self.config.chunk_count;

    for x in 0..count.x {
      for y in 0..count.y {
        for z in 0..count.z {
          let key = min + IVec3::new(x, y, z);
          let mut record = match self.records.remove(&key) {
            Some(record) => record,
            None => ChunkRecord {
              storage: self.spare_storage.pop().unwrap_or_default(),
              has_mesh: false,
            },
          };

          let (meshes, stats) =
            generate_chunk(key, shapes, &self.config, &self.table, &mut record.storage)?;
          self.present(consumer, &mut record, &meshes);
          self.record_stats(&stats);
          self.records.insert(key, record);
          report.loaded.push(key);
        }
      }
    }

    Ok(report)
  }

  /// Streaming mode: load at most one chunk and evict at most one per step.
  fn step_streaming(
    &mut self,
    reference_world: Vec3A,
    shapes: &[ShapeDescriptor],
    consumer: &mut dyn MeshConsumer,
  ) -> Result<StepReport, PipelineError> {
    let reference = self.config.world_to_chunk(reference_world);
    if self.last_reference != Some(reference) {
      self.cursor = 0;
      self.last_reference = Some(reference);
    }

    // Next unvisited offset in distance order is the load candidate.
    let mut candidate = None;
    while self.cursor < self.visit_order.len() {
      let key = reference + self.visit_order[self.cursor];
      if !self.records.contains_key(&key) {
        candidate = Some(key);
        break;
      }
      self.cursor += 1;
    }
    let Some(key) = candidate else {
      // Whole window resident: nothing to do this tick.
      return Ok(StepReport::default());
    };

    // Evict the farthest resident chunk outside the active window. If every
    // resident chunk is inside the window there is no eviction candidate;
    // generate into pooled or fresh storage instead.
    let count = self.config.chunk_count;
    let evicted = self
      .records
      .keys()
      .filter(|k| !window_contains(reference, count, **k))
      .max_by_key(|k| {
        let d = **k - reference;
        (d.length_squared(), (d.x, d.y, d.z))
      })
      .copied();

    let mut record = match evicted {
      Some(evicted_key) => {
        let record = self.records.remove(&evicted_key).expect("resident key");
        if record.has_mesh {
          consumer.retire(evicted_key);
        }
        ChunkRecord {
          storage: record.storage,
          has_mesh: false,
        }
      }
      None => ChunkRecord {
        storage: self.spare_storage.pop().unwrap_or_default(),
        has_mesh: false,
      },
    };

    let (meshes, stats) =
      generate_chunk(key, shapes, &self.config, &self.table, &mut record.storage)?;
    self.present(consumer, &mut record, &meshes);
    self.record_stats(&stats);
    self.records.insert(key, record);
    self.cursor += 1;

    Ok(StepReport {
      loaded: vec![key],
      evicted,
    })
  }

  /// Hand generated output to the consumer, retiring stale geometry first so
  /// a zero-triangle result never leaves an old mesh visible.
  fn present(
    &self,
    consumer: &mut dyn MeshConsumer,
    record: &mut ChunkRecord,
    meshes: &ChunkMeshes,
  ) {
    if meshes.is_empty() {
      if record.has_mesh {
        consumer.retire(meshes.key);
      }
      record.has_mesh = false;
    } else {
      consumer.submit(meshes);
      record.has_mesh = true;
    }
  }

  #[cfg(feature = "metrics")]
  fn record_stats(&mut self, stats: &crate::types::GenerationStats) {
    if crate::metrics::is_enabled() {
      self.metrics.record_chunk(stats);
    }
  }

  #[cfg(not(feature = "metrics"))]
  fn record_stats(&mut self, _stats: &crate::types::GenerationStats) {}
}

/// Minimum corner of the active window around a reference chunk
/// (`reference - count/2`, asymmetric for even counts).
#[inline]
fn window_min(reference: IVec3, count: IVec3) -> IVec3 {
  reference - count / 2
}

/// True when `key` lies inside the active window around `reference`.
#[inline]
fn window_contains(reference: IVec3, count: IVec3, key: ChunkKey) -> bool {
  let min = window_min(reference, count);
  let rel = key - min;
  rel.x >= 0 && rel.x < count.x && rel.y >= 0 && rel.y < count.y && rel.z >= 0 && rel.z < count.z
}

/// All window offsets sorted by squared distance from the window center,
/// ties broken by a deterministic coordinate hash so the order is strict and
/// stable across runs.
fn visitation_order(count: IVec3) -> Vec<IVec3> {
  let half = count / 2;
  let mut offsets = Vec::with_capacity((count.x * count.y * count.z) as usize);
  for x in 0..count.x {
    for y in 0..count.y {
      for z in 0..count.z {
        offsets.push(IVec3::new(x, y, z) - half);
      }
    }
  }
  offsets.sort_unstable_by_key(|o| (o.length_squared(), hash3(o.x, o.y, o.z, 0x51ED)));
  offsets
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
