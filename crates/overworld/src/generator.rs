//! Deterministic chunk generation.
//!
//! A chunk is a pure function of `(coord, seed, bounds mode, landmarks)`:
//!
//! 1. Impassable biomes fill the chunk with the wall tile.
//! 2. Each cell walks the biome's weighted tile table with
//!    `h = tile_hash(cx, cy, lx, ly, seed)`.
//! 3. A decorrelated `h2 = tile_hash(cx + 100, cy + 100, lx, ly, seed)` places
//!    trees (`h2 < tree_density`) or water (`h2 > 1 - water_chance`).
//! 4. Interior trees with 3+ blocking cardinal neighbours are replaced with
//!    the biome's fallback tile.
//! 5. A landmark prefab registered at this chunk is stamped over the result,
//!    and the cleanup runs again on cells outside its footprint.

use std::sync::Arc;

use bevy::prelude::*;

use crate::biome::{select_biome, Biome};
use crate::chunk::Chunk;
use crate::config::{WorldConfig, CHUNK_SIZE};
use crate::coords::{ChunkCoord, LocalPos};
use crate::hash::tile_hash;
use crate::landmarks::{LandmarkSource, Prefab};
use crate::tile::TileKind;

/// Chunk-coordinate salt for the tree/water overlay hash.
const OVERLAY_SALT: i32 = 100;

/// Cardinal neighbours that must be blocking for a tree to count as a trap.
const DEAD_END_THRESHOLD: usize = 3;

const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

pub struct ChunkGenerator {
    config: WorldConfig,
    landmarks: Arc<dyn LandmarkSource>,
}

impl ChunkGenerator {
    pub fn new(config: WorldConfig, landmarks: Arc<dyn LandmarkSource>) -> Self {
        Self { config, landmarks }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn landmarks(&self) -> &dyn LandmarkSource {
        self.landmarks.as_ref()
    }

    pub fn biome_at(&self, coord: ChunkCoord) -> Biome {
        select_biome(coord, &self.config)
    }

    /// Generate the chunk at `coord`. Always returns a full chunk with
    /// `generated = true`; range checks are the caller's concern.
    pub fn generate_chunk(&self, coord: ChunkCoord) -> Chunk {
        let biome = self.biome_at(coord);
        let profile = biome.profile();

        if profile.impassable {
            let mut chunk = Chunk::filled(coord, TileKind::WALL);
            chunk.generated = true;
            return chunk;
        }

        let seed = self.config.seed;
        let mut chunk = Chunk::filled(coord, profile.fallback);
        for ly in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let h = tile_hash(coord.cx, coord.cy, lx as i32, ly as i32, seed);
                let mut tile = profile.pick_tile(h);

                let h2 = tile_hash(
                    coord.cx.wrapping_add(OVERLAY_SALT),
                    coord.cy.wrapping_add(OVERLAY_SALT),
                    lx as i32,
                    ly as i32,
                    seed,
                );
                if h2 < profile.tree_density && tile != TileKind::Path && tile != TileKind::Water {
                    tile = TileKind::Tree;
                } else if h2 > 1.0 - profile.water_chance && tile != TileKind::Tree {
                    tile = TileKind::Water;
                }

                chunk.set(LocalPos::new(lx, ly), tile);
            }
        }

        let cleared = clear_dead_ends(&mut chunk, profile.fallback, |_| true);

        if let Some(prefab) = self
            .landmarks
            .landmark_at(coord)
            .and_then(|landmark| landmark.prefab.as_ref())
        {
            stamp_prefab(&mut chunk, prefab);
            clear_dead_ends(&mut chunk, profile.fallback, |local| !prefab.covers(local));
        }

        debug!(
            "Generated chunk {} ({}), cleared {} dead-end trees",
            coord,
            biome.name(),
            cleared
        );

        chunk.generated = true;
        chunk
    }
}

/// Number of blocking cardinal neighbours of an interior cell.
fn blocking_neighbours(chunk: &Chunk, lx: usize, ly: usize) -> usize {
    CARDINALS
        .iter()
        .filter(|(dx, dy)| {
            chunk
                .get_checked(lx as i32 + dx, ly as i32 + dy)
                .is_some_and(TileKind::is_blocking)
        })
        .count()
}

fn is_interior(lx: usize, ly: usize) -> bool {
    lx > 0 && ly > 0 && lx < CHUNK_SIZE - 1 && ly < CHUNK_SIZE - 1
}

/// Replace interior trees hemmed in on 3+ sides, in raster order, for cells
/// accepted by `include`. Returns the number replaced.
///
/// Only trees are considered; water and mountain clusters are left alone so
/// existing worlds keep their layout.
fn clear_dead_ends(
    chunk: &mut Chunk,
    replacement: TileKind,
    include: impl Fn(LocalPos) -> bool,
) -> usize {
    let mut cleared = 0;
    for ly in 1..CHUNK_SIZE - 1 {
        for lx in 1..CHUNK_SIZE - 1 {
            let local = LocalPos::new(lx, ly);
            if chunk.get(local) != TileKind::Tree || !include(local) {
                continue;
            }
            if blocking_neighbours(chunk, lx, ly) >= DEAD_END_THRESHOLD {
                chunk.set(local, replacement);
                cleared += 1;
            }
        }
    }
    cleared
}

/// Interior trees that still have 3+ blocking cardinal neighbours.
pub fn dead_end_trees(chunk: &Chunk) -> Vec<LocalPos> {
    let mut found = Vec::new();
    for ly in 0..CHUNK_SIZE {
        for lx in 0..CHUNK_SIZE {
            if !is_interior(lx, ly) || chunk.get(LocalPos::new(lx, ly)) != TileKind::Tree {
                continue;
            }
            if blocking_neighbours(chunk, lx, ly) >= DEAD_END_THRESHOLD {
                found.push(LocalPos::new(lx, ly));
            }
        }
    }
    found
}

/// Overwrite the prefab footprint. Cells that would land outside the chunk
/// are dropped and reported.
fn stamp_prefab(chunk: &mut Chunk, prefab: &Prefab) {
    let mut clamped = 0;
    for py in 0..prefab.height {
        for px in 0..prefab.width {
            let lx = prefab.offset.lx + px;
            let ly = prefab.offset.ly + py;
            if lx >= CHUNK_SIZE || ly >= CHUNK_SIZE {
                clamped += 1;
                continue;
            }
            if let Some(tile) = prefab.tile_at(px, py) {
                chunk.set(LocalPos::new(lx, ly), tile);
            }
        }
    }
    if clamped > 0 {
        warn!(
            "Prefab at chunk {} overhangs the chunk edge; {} cells dropped",
            chunk.coord, clamped
        );
    }
}
