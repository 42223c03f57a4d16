use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;
pub const WORLD_SEED: u32 = 42;
pub const WORLD_CHUNKS_X: i32 = 16;
pub const WORLD_CHUNKS_Y: i32 = 16;
pub const WORLD_TILES_X: i32 = WORLD_CHUNKS_X * CHUNK_SIZE as i32;
pub const WORLD_TILES_Y: i32 = WORLD_CHUNKS_Y * CHUNK_SIZE as i32;

/// Chunk that hosts the hand-authored home farm.
pub const HOME_CHUNK_X: i32 = 8;
pub const HOME_CHUNK_Y: i32 = 8;
pub const HOME_FARM_WIDTH: usize = 20;
pub const HOME_FARM_HEIGHT: usize = 18;

/// Square window loaded around the player (radius 2 = 5x5 chunks).
pub const LOAD_RADIUS: i32 = 2;
/// Chunks further than this (Chebyshev) from the player are evicted.
pub const UNLOAD_RADIUS: i32 = 4;
/// Chunks within this distance of the home chunk are never evicted.
pub const HOME_PIN_RADIUS: i32 = 1;
/// Chunks within this distance of the home chunk are always plains.
pub const HOME_PLAINS_RADIUS: i32 = 2;

/// How the addressable world is bounded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, bitcode::Encode,
    bitcode::Decode,
)]
pub enum BoundsMode {
    /// Fixed 16x16-chunk world ringed by impassable mountains.
    #[default]
    Fixed,
    /// Legacy infinite variant: bounds widen as chunks are discovered.
    Expanding,
}

/// Tunables for the chunk world. Defaults come from the constants above.
///
/// Persisted with the world state: a reloaded world regenerates from the
/// config it was saved with.
#[derive(
    Resource,
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct WorldConfig {
    /// Seed for every hash the generator evaluates.
    pub seed: u32,
    pub bounds_mode: BoundsMode,
    pub load_radius: i32,
    pub unload_radius: i32,
    pub home_pin_radius: i32,
    /// Home chunk; the home offset is this chunk's origin tile.
    pub home_chunk: (i32, i32),
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: WORLD_SEED,
            bounds_mode: BoundsMode::Fixed,
            load_radius: LOAD_RADIUS,
            unload_radius: UNLOAD_RADIUS,
            home_pin_radius: HOME_PIN_RADIUS,
            home_chunk: (HOME_CHUNK_X, HOME_CHUNK_Y),
        }
    }
}

impl WorldConfig {
    /// Upper bound on resident chunks: the unload window plus the pinned home set.
    pub fn max_resident_chunks(&self) -> usize {
        let window = (2 * self.unload_radius + 1) as usize;
        let pinned = (2 * self.home_pin_radius + 1) as usize;
        window * window + pinned * pinned
    }
}
