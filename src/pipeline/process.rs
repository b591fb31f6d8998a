//! Chunk generation orchestrator.
//!
//! Runs the full lattice → mesher → assembler sequence for one chunk. This is
//! the synchronous entry point; the scheduler and the async wrapper both call
//! through here.

use web_time::Instant;

use crate::assembler::assemble;
use crate::constants::LatticeDims;
use crate::shapes::{KernelTable, ShapeDescriptor};
use crate::tetra;
use crate::types::{GenerateConfig, GenerationStats};

use super::types::{ChunkKey, ChunkMeshes, ChunkStorage, PipelineError};

/// Generate one chunk's meshes into recycled storage.
///
/// Short-circuits to empty output (without touching the mesher) when the
/// resolved shape list is empty or when the folded field never crosses zero.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, fields(chunk = ?key), name = "pipeline::generate_chunk")
)]
pub fn generate_chunk(
  key: ChunkKey,
  shapes: &[ShapeDescriptor],
  config: &GenerateConfig,
  table: &KernelTable,
  storage: &mut ChunkStorage,
) -> Result<(ChunkMeshes, GenerationStats), PipelineError> {
  let mut stats = GenerationStats::default();

  let resolved = table.resolve(shapes);
  if resolved.is_empty() {
    // No active shapes: the field is all-outside by definition.
    return Ok((ChunkMeshes::empty(key), stats));
  }

  let dims = LatticeDims::new(config.cell_count);
  storage.lattice.prepare(dims, config.cell_scale)?;

  let chunk_to_world = config.chunk_to_world(key);

  let start = Instant::now();
  storage.lattice.build(&resolved, &chunk_to_world);
  stats.field_us = start.elapsed().as_micros() as u64;

  if storage.lattice.is_homogeneous() {
    return Ok((ChunkMeshes::empty(key), stats));
  }

  storage.triangles.prepare(dims.cell_count())?;

  let start = Instant::now();
  stats.triangle_count = tetra::generate(
    &storage.lattice,
    &mut storage.triangles,
    config.flip_normals,
  );
  stats.mesh_us = start.elapsed().as_micros() as u64;

  let start = Instant::now();
  let buffers = assemble(&storage.triangles, config);
  stats.weld_us = start.elapsed().as_micros() as u64;

  Ok((ChunkMeshes { key, buffers }, stats))
}

#[cfg(test)]
#[path = "process_test.rs"]
mod process_test;
