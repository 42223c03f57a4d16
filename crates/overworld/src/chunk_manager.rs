//! Sparse map of loaded chunks and the streaming policy around the player.
//!
//! A chunk is either loaded (present in the map, tiles readable) or unloaded
//! (absent, reads return `None`). Loading is synchronous: a chunk generated
//! by `update_player_position` is readable as soon as the call returns.
//!
//! Chunks within `home_pin_radius` of the home chunk are pinned and never
//! evicted; they are also the only chunks written by [`ChunkManager::state`].
//! Edits anywhere else live until the chunk is evicted and then regenerate
//! from the seed.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;

use crate::biome::Biome;
use crate::chunk::Chunk;
use crate::config::{BoundsMode, WorldConfig, WORLD_CHUNKS_X, WORLD_CHUNKS_Y, WORLD_TILES_X, WORLD_TILES_Y};
use crate::coords::{world_to_chunk, world_to_local, ChunkCoord, LocalPos, TilePos, TileRect};
use crate::generator::ChunkGenerator;
use crate::landmarks::{Landmark, LandmarkRegistry, LandmarkSource};
use crate::tile::TileKind;
use crate::world_error::WorldError;
use crate::world_state::{
    SavedChunk, WorldState, CONFIG_RECORDED_VERSION, CURRENT_WORLD_STATE_VERSION,
};
use crate::world_state_migrate::{farm_footprint, migrate_world_state, MigrationReport};

/// Neighbour bits for [`ChunkManager::tile_bitmask`].
pub const MASK_NORTH: u8 = 1;
pub const MASK_EAST: u8 = 2;
pub const MASK_SOUTH: u8 = 4;
pub const MASK_WEST: u8 = 8;

const MASK_DIRS: [(i32, i32, u8); 4] = [
    (0, -1, MASK_NORTH),
    (1, 0, MASK_EAST),
    (0, 1, MASK_SOUTH),
    (-1, 0, MASK_WEST),
];

/// What one `update_player_position` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub player_chunk: ChunkCoord,
    /// Newly generated chunks, in window order.
    pub loaded: Vec<ChunkCoord>,
    /// Evicted chunks, sorted.
    pub evicted: Vec<ChunkCoord>,
}

impl StreamReport {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.evicted.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    pub loaded: usize,
    pub pinned: usize,
    pub generated_total: u64,
    pub evicted_total: u64,
}

#[derive(Resource)]
pub struct ChunkManager {
    generator: ChunkGenerator,
    chunks: HashMap<ChunkCoord, Chunk>,
    home_chunk: ChunkCoord,
    home_offset: TilePos,
    /// Expanding mode only: every chunk ever loaded, plus the pinned set.
    discovered: TileRect,
    player_chunk: Option<ChunkCoord>,
    last_unlock_tokens: u32,
    generated_total: u64,
    evicted_total: u64,
}

impl Default for ChunkManager {
    fn default() -> Self {
        Self::with_config(WorldConfig::default())
    }
}

impl ChunkManager {
    pub fn new(mut config: WorldConfig, landmarks: Arc<dyn LandmarkSource>) -> Self {
        if config.unload_radius < config.load_radius {
            warn!(
                "ChunkManager: unload radius {} is inside load radius {}; raising it",
                config.unload_radius, config.load_radius
            );
            config.unload_radius = config.load_radius;
        }

        let home_chunk = ChunkCoord::new(config.home_chunk.0, config.home_chunk.1);
        let discovered = home_chunk
            .square(config.home_pin_radius)
            .map(ChunkCoord::tile_rect)
            .fold(home_chunk.tile_rect(), TileRect::union);

        Self {
            generator: ChunkGenerator::new(config, landmarks),
            chunks: HashMap::new(),
            home_chunk,
            home_offset: home_chunk.origin(),
            discovered,
            player_chunk: None,
            last_unlock_tokens: 0,
            generated_total: 0,
            evicted_total: 0,
        }
    }

    /// Manager over the standard landmark registry for `config`'s home chunk.
    pub fn with_config(config: WorldConfig) -> Self {
        let home = ChunkCoord::new(config.home_chunk.0, config.home_chunk.1);
        Self::new(config, Arc::new(LandmarkRegistry::standard(home)))
    }

    /// Rebuild the world a state was saved from: its config, then its chunks,
    /// then any pinned chunk the state did not carry.
    ///
    /// States older than the config record, or newer than this build, load
    /// under the default config; one that cannot be migrated leaves a fresh
    /// world.
    pub fn from_state(state: WorldState) -> Self {
        let recorded =
            (CONFIG_RECORDED_VERSION..=CURRENT_WORLD_STATE_VERSION).contains(&state.version);
        let config = if recorded {
            state.config.clone()
        } else {
            WorldConfig::default()
        };
        let mut manager = Self::with_config(config);
        if let Err(e) = manager.load_state(state) {
            warn!("World state: {}, starting from a fresh world", e);
        }
        manager.ensure_home_loaded();
        manager
    }

    pub fn config(&self) -> &WorldConfig {
        self.generator.config()
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    // -----------------------------------------------------------------------
    // Coordinates and bounds
    // -----------------------------------------------------------------------

    #[inline]
    pub fn world_to_chunk(&self, col: i32, row: i32) -> ChunkCoord {
        world_to_chunk(col, row)
    }

    #[inline]
    pub fn world_to_local(&self, col: i32, row: i32) -> LocalPos {
        world_to_local(col, row)
    }

    /// Whether `coord` may ever be generated.
    pub fn in_chunk_bounds(&self, coord: ChunkCoord) -> bool {
        match self.config().bounds_mode {
            BoundsMode::Fixed => {
                (0..WORLD_CHUNKS_X).contains(&coord.cx) && (0..WORLD_CHUNKS_Y).contains(&coord.cy)
            }
            BoundsMode::Expanding => true,
        }
    }

    /// Whole addressable world, for camera clamping. Fixed in the default
    /// mode; in expanding mode it grows as chunks are discovered.
    pub fn full_world_bounds(&self) -> TileRect {
        match self.config().bounds_mode {
            BoundsMode::Fixed => TileRect {
                min_col: 0,
                min_row: 0,
                max_col: WORLD_TILES_X - 1,
                max_row: WORLD_TILES_Y - 1,
            },
            BoundsMode::Expanding => self.discovered,
        }
    }

    /// Bounding rectangle of the loaded chunks, for render culling.
    pub fn world_bounds(&self) -> Option<TileRect> {
        self.chunks
            .keys()
            .map(|coord| coord.tile_rect())
            .reduce(TileRect::union)
    }

    // -----------------------------------------------------------------------
    // Tiles
    // -----------------------------------------------------------------------

    /// `Some(WALL)` outside the world, `None` when the owning chunk is not
    /// loaded, otherwise the stored tile.
    pub fn tile(&self, col: i32, row: i32) -> Option<TileKind> {
        if !self.full_world_bounds().contains(col, row) {
            return Some(TileKind::WALL);
        }
        let chunk = self.chunks.get(&world_to_chunk(col, row))?;
        Some(chunk.get(world_to_local(col, row)))
    }

    /// Overwrite one tile. Fails when the owning chunk is not loaded.
    pub fn set_tile(&mut self, col: i32, row: i32, kind: TileKind) -> bool {
        if !self.full_world_bounds().contains(col, row) {
            return false;
        }
        match self.chunks.get_mut(&world_to_chunk(col, row)) {
            Some(chunk) => {
                chunk.set(world_to_local(col, row), kind);
                true
            }
            None => false,
        }
    }

    pub fn is_fog(&self, col: i32, row: i32) -> bool {
        !self.chunks.contains_key(&world_to_chunk(col, row))
    }

    /// 4-bit edge mask: a bit is set when that cardinal neighbour is known
    /// and differs from the centre. Unknown centres give 0.
    pub fn tile_bitmask(&self, col: i32, row: i32) -> u8 {
        let Some(centre) = self.tile(col, row) else {
            return 0;
        };
        MASK_DIRS
            .iter()
            .filter(|(dx, dy, _)| {
                // Past the edge of tile space is outside every world.
                let neighbour = match (col.checked_add(*dx), row.checked_add(*dy)) {
                    (Some(c), Some(r)) => self.tile(c, r),
                    _ => Some(TileKind::WALL),
                };
                neighbour.is_some_and(|neighbour| neighbour != centre)
            })
            .fold(0, |mask, (_, _, bit)| mask | bit)
    }

    // -----------------------------------------------------------------------
    // Chunks and streaming
    // -----------------------------------------------------------------------

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn is_pinned(&self, coord: ChunkCoord) -> bool {
        coord.chebyshev(self.home_chunk) <= self.config().home_pin_radius
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Loaded chunk coordinates, sorted.
    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort();
        coords
    }

    pub fn biome_at(&self, coord: ChunkCoord) -> Biome {
        self.generator.biome_at(coord)
    }

    /// Generate and store `coord`. Returns false when it is already loaded or
    /// outside the world.
    pub fn load_chunk(&mut self, coord: ChunkCoord) -> bool {
        if !self.in_chunk_bounds(coord) || self.chunks.contains_key(&coord) {
            return false;
        }
        let chunk = self.generator.generate_chunk(coord);
        self.chunks.insert(coord, chunk);
        self.generated_total += 1;
        if self.config().bounds_mode == BoundsMode::Expanding {
            self.discovered = self.discovered.union(coord.tile_rect());
        }
        true
    }

    /// Load the window around the player, then evict chunks beyond the unload
    /// radius that are not pinned.
    pub fn update_player_position(&mut self, col: i32, row: i32) -> StreamReport {
        let player_chunk = world_to_chunk(col, row);
        let mut report = StreamReport {
            player_chunk,
            ..Default::default()
        };

        let load_radius = self.config().load_radius;
        for coord in player_chunk.square(load_radius) {
            if self.load_chunk(coord) {
                report.loaded.push(coord);
            }
        }

        let unload_radius = self.config().unload_radius;
        let mut evict: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .copied()
            .filter(|&coord| coord.chebyshev(player_chunk) > unload_radius && !self.is_pinned(coord))
            .collect();
        evict.sort();
        for coord in &evict {
            self.chunks.remove(coord);
        }
        self.evicted_total += evict.len() as u64;
        report.evicted = evict;

        if self.player_chunk != Some(player_chunk) {
            debug!(
                "Player entered chunk {}: +{} -{} ({} loaded)",
                player_chunk,
                report.loaded.len(),
                report.evicted.len(),
                self.chunks.len()
            );
            self.player_chunk = Some(player_chunk);
        }
        report
    }

    pub fn player_chunk(&self) -> Option<ChunkCoord> {
        self.player_chunk
    }

    pub fn stats(&self) -> ChunkStats {
        ChunkStats {
            loaded: self.chunks.len(),
            pinned: self.chunks.keys().filter(|&&c| self.is_pinned(c)).count(),
            generated_total: self.generated_total,
            evicted_total: self.evicted_total,
        }
    }

    // -----------------------------------------------------------------------
    // Landmarks
    // -----------------------------------------------------------------------

    /// First interactable landmark whose footprint centre is within `range`
    /// tiles (Chebyshev) of `(col, row)`.
    pub fn near_landmark(&self, col: i32, row: i32, range: i32) -> Option<&Landmark> {
        let query = TilePos::new(col, row);
        self.generator
            .landmarks()
            .landmarks()
            .iter()
            .find(|l| l.interactable && l.footprint_center().chebyshev(query) <= range)
    }

    // -----------------------------------------------------------------------
    // Home farm
    // -----------------------------------------------------------------------

    pub fn home_chunk(&self) -> ChunkCoord {
        self.home_chunk
    }

    /// World tile of farm-local `(0, 0)`.
    pub fn home_offset(&self) -> TilePos {
        self.home_offset
    }

    pub fn farm_to_world(&self, fx: i32, fy: i32) -> TilePos {
        TilePos::new(self.home_offset.col + fx, self.home_offset.row + fy)
    }

    pub fn world_to_farm(&self, col: i32, row: i32) -> TilePos {
        TilePos::new(col - self.home_offset.col, row - self.home_offset.row)
    }

    pub fn farm_bounds(&self) -> TileRect {
        farm_footprint(self.home_offset)
    }

    /// Generate any pinned chunk that is not loaded. Returns how many were.
    pub fn ensure_home_loaded(&mut self) -> usize {
        let pinned: Vec<ChunkCoord> = self
            .home_chunk
            .square(self.config().home_pin_radius)
            .collect();
        pinned
            .into_iter()
            .filter(|&coord| self.load_chunk(coord))
            .count()
    }

    /// Load the pinned home chunks and write the farm layout over them.
    /// Returns the number of tiles written.
    pub fn init_home(&mut self, tiles: &[TileKind], width: usize, height: usize) -> usize {
        self.ensure_home_loaded();

        if tiles.len() < width * height {
            warn!(
                "init_home: layout has {} tiles for {}x{}; missing tiles keep generated terrain",
                tiles.len(),
                width,
                height
            );
        }

        let mut written = 0;
        for fy in 0..height {
            for fx in 0..width {
                let Some(&tile) = tiles.get(fy * width + fx) else {
                    continue;
                };
                let pos = self.farm_to_world(fx as i32, fy as i32);
                if self.set_tile(pos.col, pos.row, tile) {
                    written += 1;
                }
            }
        }

        if written < width * height {
            warn!(
                "init_home: {} of {} farm tiles fall outside the loaded home chunks",
                width * height - written,
                width * height
            );
        }
        info!(
            "Home farm initialised at ({}, {}): {} tiles, {} chunks loaded",
            self.home_offset.col,
            self.home_offset.row,
            written,
            self.chunks.len()
        );
        written
    }

    pub fn unlock_tokens(&self) -> u32 {
        self.last_unlock_tokens
    }

    pub fn set_unlock_tokens(&mut self, tokens: u32) {
        self.last_unlock_tokens = tokens;
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Loaded chunks within the pinned radius of home, at the current schema
    /// version.
    pub fn state(&self) -> WorldState {
        let chunks = self
            .chunks
            .iter()
            .filter(|&(&coord, _)| self.is_pinned(coord))
            .map(|(coord, chunk)| (coord.key(), SavedChunk::from_chunk(chunk)))
            .collect();
        WorldState {
            version: CURRENT_WORLD_STATE_VERSION,
            chunks,
            home_offset: self.home_offset,
            last_unlock_tokens: self.last_unlock_tokens,
            config: self.config().clone(),
        }
    }

    /// Migrate `state` to the current version and restore its chunks over
    /// whatever is loaded. Malformed entries are skipped with a warning;
    /// unknown labels fall back to the generated tile.
    ///
    /// The manager's own config and home offset win over the stored ones;
    /// use [`ChunkManager::from_state`] to rebuild the world the state was
    /// saved from.
    pub fn load_state(&mut self, mut state: WorldState) -> Result<MigrationReport, WorldError> {
        if state.home_offset != self.home_offset {
            warn!(
                "World state home offset ({}, {}) differs from configured ({}, {}); keeping configured",
                state.home_offset.col,
                state.home_offset.row,
                self.home_offset.col,
                self.home_offset.row
            );
        }

        let report = migrate_world_state(&mut state, self.home_offset)?;

        if state.config != *self.config() {
            warn!(
                "World state was generated with seed {} ({:?}); keeping configured seed {} ({:?})",
                state.config.seed,
                state.config.bounds_mode,
                self.config().seed,
                self.config().bounds_mode
            );
        }

        let mut restored = 0;
        for (key, saved) in &state.chunks {
            let Some(coord) = ChunkCoord::from_key(key) else {
                warn!("World state: {}", WorldError::InvalidChunkKey(key.clone()));
                continue;
            };
            if !self.in_chunk_bounds(coord) {
                warn!("World state: chunk {} is outside the world, skipping", coord);
                continue;
            }
            let parsed = match saved.parse_tiles(key) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("World state: {}", e);
                    continue;
                }
            };

            let generated = self.generator.generate_chunk(coord);
            let mut unknown = 0;
            let tiles = parsed
                .into_iter()
                .zip(generated.tiles.iter())
                .map(|(tile, &fallback)| {
                    tile.unwrap_or_else(|| {
                        unknown += 1;
                        fallback
                    })
                })
                .collect();
            if unknown > 0 {
                warn!(
                    "World state: chunk {} had {} unknown tile labels, regenerated them",
                    coord, unknown
                );
            }

            self.chunks.insert(
                coord,
                Chunk {
                    coord,
                    tiles,
                    generated: saved.generated,
                    locked: saved.locked,
                },
            );
            if self.config().bounds_mode == BoundsMode::Expanding {
                self.discovered = self.discovered.union(coord.tile_rect());
            }
            restored += 1;
        }

        self.last_unlock_tokens = state.last_unlock_tokens;
        info!(
            "World state loaded: v{} -> v{}, {} chunks restored",
            report.original_version, report.final_version, restored
        );
        Ok(report)
    }
}
