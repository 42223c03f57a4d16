//! Biome table and per-chunk biome selection.

use serde::{Deserialize, Serialize};

use crate::config::{BoundsMode, WorldConfig, HOME_PLAINS_RADIUS, WORLD_CHUNKS_X, WORLD_CHUNKS_Y};
use crate::coords::ChunkCoord;
use crate::hash::tile_hash;
use crate::tile::TileKind;

/// Local coordinates outside `0..CHUNK_SIZE`, so biome hashes never share a
/// value with a terrain tile of the same chunk.
const BLEND_SALT: (i32, i32) = (-7, -13);
const NORTH_SALT: (i32, i32) = (-13, -7);

/// Base probability that a chunk takes its quadrant biome rather than plains;
/// grows with distance from the centre.
const BLEND_BASE: f64 = 0.35;
const BLEND_DISTANCE_GAIN: f64 = 0.5;

/// Distance (in chunks) at which the blend saturates in the expanding world.
const EXPANDING_FALLOFF_CHUNKS: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    Plains,
    Forest,
    Desert,
    Wetland,
    Rocky,
    Mountain,
}

/// Terrain-generation profile for one biome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeProfile {
    /// Cumulative-walk distribution. Weights sum to at most 1; the remainder
    /// falls through to `fallback`.
    pub tile_weights: &'static [(TileKind, f64)],
    pub tree_density: f64,
    pub water_chance: f64,
    /// Walkable tile used when weights are exhausted and by dead-end cleanup.
    pub fallback: TileKind,
    /// Every tile in the chunk becomes `TileKind::WALL`.
    pub impassable: bool,
}

const PLAINS: BiomeProfile = BiomeProfile {
    tile_weights: &[
        (TileKind::Grass, 0.70),
        (TileKind::DarkGrass, 0.20),
        (TileKind::Dirt, 0.06),
        (TileKind::Path, 0.02),
    ],
    tree_density: 0.06,
    water_chance: 0.02,
    fallback: TileKind::Grass,
    impassable: false,
};

const FOREST: BiomeProfile = BiomeProfile {
    tile_weights: &[
        (TileKind::DarkGrass, 0.55),
        (TileKind::Grass, 0.35),
        (TileKind::Dirt, 0.05),
    ],
    tree_density: 0.28,
    water_chance: 0.03,
    fallback: TileKind::DarkGrass,
    impassable: false,
};

const DESERT: BiomeProfile = BiomeProfile {
    tile_weights: &[
        (TileKind::Sand, 0.80),
        (TileKind::Dirt, 0.10),
        (TileKind::Stone, 0.05),
    ],
    tree_density: 0.01,
    water_chance: 0.01,
    fallback: TileKind::Sand,
    impassable: false,
};

const WETLAND: BiomeProfile = BiomeProfile {
    tile_weights: &[
        (TileKind::Grass, 0.45),
        (TileKind::DarkGrass, 0.30),
        (TileKind::Dirt, 0.10),
        (TileKind::Sand, 0.05),
    ],
    tree_density: 0.08,
    water_chance: 0.18,
    fallback: TileKind::Grass,
    impassable: false,
};

const ROCKY: BiomeProfile = BiomeProfile {
    tile_weights: &[
        (TileKind::Stone, 0.45),
        (TileKind::Dirt, 0.25),
        (TileKind::Grass, 0.20),
    ],
    tree_density: 0.04,
    water_chance: 0.01,
    fallback: TileKind::Dirt,
    impassable: false,
};

const MOUNTAIN: BiomeProfile = BiomeProfile {
    tile_weights: &[],
    tree_density: 0.0,
    water_chance: 0.0,
    fallback: TileKind::WALL,
    impassable: true,
};

impl Biome {
    pub const ALL: [Biome; 6] = [
        Biome::Plains,
        Biome::Forest,
        Biome::Desert,
        Biome::Wetland,
        Biome::Rocky,
        Biome::Mountain,
    ];

    pub fn profile(self) -> &'static BiomeProfile {
        match self {
            Biome::Plains => &PLAINS,
            Biome::Forest => &FOREST,
            Biome::Desert => &DESERT,
            Biome::Wetland => &WETLAND,
            Biome::Rocky => &ROCKY,
            Biome::Mountain => &MOUNTAIN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Plains => "plains",
            Biome::Forest => "forest",
            Biome::Desert => "desert",
            Biome::Wetland => "wetland",
            Biome::Rocky => "rocky",
            Biome::Mountain => "mountain",
        }
    }
}

impl BiomeProfile {
    /// Walk the weights cumulatively; the first tile whose running total
    /// exceeds `h` wins.
    pub fn pick_tile(&self, h: f64) -> TileKind {
        let mut cumulative = 0.0;
        for &(tile, weight) in self.tile_weights {
            cumulative += weight;
            if h < cumulative {
                return tile;
            }
        }
        self.fallback
    }
}

/// Chunk the angular partition is measured from.
fn centre_chunk(config: &WorldConfig) -> ChunkCoord {
    match config.bounds_mode {
        BoundsMode::Fixed => ChunkCoord::new(WORLD_CHUNKS_X / 2, WORLD_CHUNKS_Y / 2),
        BoundsMode::Expanding => ChunkCoord::new(config.home_chunk.0, config.home_chunk.1),
    }
}

/// Distance (in rings) from the fixed world's edge; 0 is the outermost ring.
fn ring_depth(coord: ChunkCoord) -> i32 {
    let left = coord.cx;
    let top = coord.cy;
    let right = (WORLD_CHUNKS_X - 1).saturating_sub(coord.cx);
    let bottom = (WORLD_CHUNKS_Y - 1).saturating_sub(coord.cy);
    left.min(top).min(right).min(bottom)
}

/// Deterministic biome for a chunk; a pure function of the chunk coordinate
/// and the world configuration.
pub fn select_biome(coord: ChunkCoord, config: &WorldConfig) -> Biome {
    let fixed = config.bounds_mode == BoundsMode::Fixed;

    if fixed && ring_depth(coord) <= 0 {
        return Biome::Mountain;
    }

    let home = ChunkCoord::new(config.home_chunk.0, config.home_chunk.1);
    if coord.chebyshev(home) <= HOME_PLAINS_RADIUS {
        return Biome::Plains;
    }

    if fixed && ring_depth(coord) == 1 {
        return Biome::Rocky;
    }

    let centre = centre_chunk(config);
    let dx = coord.cx as f64 - centre.cx as f64;
    let dy = coord.cy as f64 - centre.cy as f64;
    if dx == 0.0 && dy == 0.0 {
        return Biome::Plains;
    }

    let distance = (dx * dx + dy * dy).sqrt();
    let max_distance = match config.bounds_mode {
        BoundsMode::Fixed => {
            let hx = (WORLD_CHUNKS_X / 2) as f64;
            let hy = (WORLD_CHUNKS_Y / 2) as f64;
            (hx * hx + hy * hy).sqrt()
        }
        BoundsMode::Expanding => EXPANDING_FALLOFF_CHUNKS,
    };
    let normalized_distance = (distance / max_distance).min(1.0);

    // Rows grow southwards, so positive dy points south.
    let mut angle = dy.atan2(dx) / std::f64::consts::TAU;
    if angle < 0.0 {
        angle += 1.0;
    }

    let quadrant_biome = if !(0.125..0.875).contains(&angle) {
        Biome::Desert
    } else if angle < 0.375 {
        Biome::Wetland
    } else if angle < 0.625 {
        Biome::Forest
    } else if tile_hash(coord.cx, coord.cy, NORTH_SALT.0, NORTH_SALT.1, config.seed) < 0.5 {
        Biome::Rocky
    } else {
        Biome::Forest
    };

    let blend = tile_hash(coord.cx, coord.cy, BLEND_SALT.0, BLEND_SALT.1, config.seed);
    if blend < BLEND_BASE + BLEND_DISTANCE_GAIN * normalized_distance {
        quadrant_biome
    } else {
        Biome::Plains
    }
}
