//! Tile sampling on a pool of worker threads.
//!
//! Tiles are queued on a bounded channel and picked up by named workers,
//! which evaluate every vertex of their tile against one shared
//! [`TerrainFunction`]. Border vertices are also recorded in a concurrent
//! map keyed by lattice point; a second tile reaching the same vertex, on its
//! own face or across a cube edge, must produce the same bits, otherwise the
//! seam is counted as a mismatch.

use std::io;
use std::sync::Arc;

use crossbeam_channel::bounded;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use telluric_terrain::TerrainFunction;
use tracing::{debug, trace};

use crate::grid::{Grid, TileId, VertexKey};

/// Aggregate of one full sampling pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Vertex evaluations, shared vertices counted once per tile.
    pub samples: u64,
    /// Times a tile reached a border vertex another tile already evaluated.
    pub shared_vertices: u64,
    /// Shared vertices whose elevation differed between tiles.
    pub seam_mismatches: u64,
}

#[derive(Debug)]
struct TileStats {
    min: f64,
    max: f64,
    sum: f64,
    samples: u64,
    shared: u64,
    mismatches: u64,
}

fn sample_tile(
    function: &TerrainFunction,
    grid: &Grid,
    seams: &DashMap<VertexKey, u64>,
    tile: TileId,
) -> TileStats {
    let mut stats = TileStats {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        sum: 0.0,
        samples: 0,
        shared: 0,
        mismatches: 0,
    };

    for j in 0..grid.resolution() {
        for i in 0..grid.resolution() {
            let key = grid.vertex(tile, i, j);
            let elevation = function.elevation(grid.direction(key) * function.radius());
            stats.min = stats.min.min(elevation);
            stats.max = stats.max.max(elevation);
            stats.sum += elevation;
            stats.samples += 1;

            if grid.is_border(i, j) {
                match seams.entry(key) {
                    Entry::Occupied(seen) => {
                        stats.shared += 1;
                        if *seen.get() != elevation.to_bits() {
                            stats.mismatches += 1;
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(elevation.to_bits());
                    }
                }
            }
        }
    }
    stats
}

/// Sample every tile of `grid` on `threads` workers (0 = one per logical CPU).
///
/// The summary is reduced in tile order, so it is identical for any thread
/// count. Fails only if a worker thread cannot be spawned or panics.
pub fn sample_body(
    function: Arc<TerrainFunction>,
    grid: Grid,
    threads: usize,
) -> io::Result<Summary> {
    let threads = if threads == 0 { num_cpus::get() } else { threads }.max(1);
    let tiles: Vec<TileId> = grid.tiles().collect();

    let (task_sender, task_receiver) = bounded::<TileId>(tiles.len());
    let (result_sender, result_receiver) = bounded::<(TileId, TileStats)>(threads * 4);
    let seams = Arc::new(DashMap::new());

    let mut workers = Vec::with_capacity(threads);
    for _ in 0..threads {
        let receiver = task_receiver.clone();
        let sender = result_sender.clone();
        let function = Arc::clone(&function);
        let seams = Arc::clone(&seams);

        let handle = std::thread::Builder::new()
            .name("tile-worker".into())
            .spawn(move || {
                while let Ok(tile) = receiver.recv() {
                    let stats = sample_tile(&function, &grid, &seams, tile);
                    trace!(?tile, min = stats.min, max = stats.max, "sampled tile");
                    if sender.send((tile, stats)).is_err() {
                        break;
                    }
                }
            })?;
        workers.push(handle);
    }
    drop(result_sender);

    for tile in &tiles {
        // Capacity covers every tile, so this never blocks.
        if task_sender.send(*tile).is_err() {
            break;
        }
    }
    drop(task_sender);
    debug!(tiles = tiles.len(), threads, "queued tiles");

    let mut results: Vec<(TileId, TileStats)> = result_receiver.iter().collect();

    for worker in workers {
        worker
            .join()
            .map_err(|_| io::Error::other("tile worker panicked"))?;
    }
    if results.len() != tiles.len() {
        return Err(io::Error::other(format!(
            "sampled {} of {} tiles",
            results.len(),
            tiles.len()
        )));
    }

    results.sort_by_key(|(tile, _)| *tile);
    let mut summary = Summary {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        mean: 0.0,
        samples: 0,
        shared_vertices: 0,
        seam_mismatches: 0,
    };
    let mut sum = 0.0;
    for (_, stats) in &results {
        summary.min = summary.min.min(stats.min);
        summary.max = summary.max.max(stats.max);
        summary.samples += stats.samples;
        summary.shared_vertices += stats.shared;
        summary.seam_mismatches += stats.mismatches;
        sum += stats.sum;
    }
    summary.mean = sum / summary.samples as f64;
    Ok(summary)
}
