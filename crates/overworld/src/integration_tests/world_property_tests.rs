//! Randomized property tests for the chunk world.
//!
//! Uses manual randomized testing with `rand` to verify:
//! - Coordinate round-trip for arbitrary (including negative) tiles
//! - Generation determinism across independent generators
//! - No trapped trees in any generated chunk
//! - Memory bound and pinning under random walks and teleports
//! - Tile reads agree with the owning chunk

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::chunk_manager::ChunkManager;
use crate::config::{BoundsMode, WorldConfig, CHUNK_SIZE, HOME_FARM_HEIGHT, HOME_FARM_WIDTH};
use crate::coords::{local_to_world, world_to_chunk, world_to_local, ChunkCoord};
use crate::generator::{dead_end_trees, ChunkGenerator};
use crate::home_farm::home_farm_tiles;
use crate::landmarks::LandmarkRegistry;
use crate::tile::TileKind;

const NUM_SAMPLES: usize = 2000;
const SEED: u64 = 0x0F4E_57A7_E000_0042;

fn expanding_config() -> WorldConfig {
    WorldConfig {
        bounds_mode: BoundsMode::Expanding,
        ..WorldConfig::default()
    }
}

// ---------------------------------------------------------------------------
// 1. Coordinates
// ---------------------------------------------------------------------------

#[test]
fn prop_coordinate_roundtrip() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let size = CHUNK_SIZE as i32;
    for _ in 0..NUM_SAMPLES {
        let col = rng.gen_range(-1_000_000..1_000_000);
        let row = rng.gen_range(-1_000_000..1_000_000);
        let chunk = world_to_chunk(col, row);
        let local = world_to_local(col, row);
        assert!(local.lx < CHUNK_SIZE && local.ly < CHUNK_SIZE);
        assert_eq!(chunk.cx * size + local.lx as i32, col);
        assert_eq!(chunk.cy * size + local.ly as i32, row);
        let back = local_to_world(chunk, local);
        assert_eq!((back.col, back.row), (col, row));
    }
}

// ---------------------------------------------------------------------------
// 2. Generation
// ---------------------------------------------------------------------------

#[test]
fn prop_generation_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let a = ChunkGenerator::new(expanding_config(), Arc::new(LandmarkRegistry::empty()));
    let b = ChunkGenerator::new(expanding_config(), Arc::new(LandmarkRegistry::empty()));
    for _ in 0..200 {
        let coord = ChunkCoord::new(rng.gen_range(-500..500), rng.gen_range(-500..500));
        assert_eq!(a.generate_chunk(coord), b.generate_chunk(coord), "chunk {coord}");
    }
}

#[test]
fn prop_no_trapped_trees_anywhere() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 0x55);
    for _ in 0..20 {
        let config = WorldConfig {
            seed: rng.gen(),
            ..expanding_config()
        };
        let gen = ChunkGenerator::new(config, Arc::new(LandmarkRegistry::empty()));
        for _ in 0..20 {
            let coord = ChunkCoord::new(rng.gen_range(-50..50), rng.gen_range(-50..50));
            let chunk = gen.generate_chunk(coord);
            assert!(
                dead_end_trees(&chunk).is_empty(),
                "chunk {coord} has trapped trees"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Streaming
// ---------------------------------------------------------------------------

#[test]
fn prop_random_walk_respects_bound_and_pinning() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut mgr = ChunkManager::default();
    mgr.init_home(&home_farm_tiles(), HOME_FARM_WIDTH, HOME_FARM_HEIGHT);
    let bound = mgr.config().max_resident_chunks();
    let pinned: Vec<ChunkCoord> = mgr.home_chunk().square(1).collect();

    let (mut col, mut row) = (138, 140);
    for step in 0..NUM_SAMPLES {
        if rng.gen_bool(0.02) {
            // Teleport, including outside the world.
            col = rng.gen_range(-40..300);
            row = rng.gen_range(-40..300);
        } else {
            col += rng.gen_range(-6..=6);
            row += rng.gen_range(-6..=6);
        }
        let report = mgr.update_player_position(col, row);

        assert!(mgr.loaded_chunk_count() <= bound, "step {step}: over bound");
        for coord in &pinned {
            assert!(mgr.is_loaded(*coord), "step {step}: pinned {coord} evicted");
        }
        for coord in &report.loaded {
            assert!(!report.evicted.contains(coord), "step {step}: {coord} loaded and evicted");
        }
        for coord in mgr.loaded_coords() {
            assert!(
                mgr.is_pinned(coord) || coord.chebyshev(report.player_chunk) <= 4,
                "step {step}: stale chunk {coord}"
            );
        }
    }
}

#[test]
fn prop_tile_reads_match_chunks() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 0xAA);
    let mut mgr = ChunkManager::default();
    mgr.update_player_position(120, 90);
    for _ in 0..NUM_SAMPLES {
        let col = rng.gen_range(-20..280);
        let row = rng.gen_range(-20..280);
        let tile = mgr.tile(col, row);
        if !mgr.full_world_bounds().contains(col, row) {
            assert_eq!(tile, Some(TileKind::Mountain));
            continue;
        }
        match mgr.chunk(world_to_chunk(col, row)) {
            Some(chunk) => {
                assert_eq!(tile, Some(chunk.get(world_to_local(col, row))));
                assert!(!mgr.is_fog(col, row));
            }
            None => {
                assert_eq!(tile, None);
                assert!(mgr.is_fog(col, row));
                assert_eq!(mgr.tile_bitmask(col, row), 0);
            }
        }
    }
}

#[test]
fn prop_bitmask_matches_neighbours() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 0x77);
    let mut mgr = ChunkManager::default();
    mgr.update_player_position(100, 150);
    for _ in 0..NUM_SAMPLES {
        let col = rng.gen_range(64..144);
        let row = rng.gen_range(112..192);
        let Some(centre) = mgr.tile(col, row) else {
            continue;
        };
        let mask = mgr.tile_bitmask(col, row);
        for (dx, dy, bit) in [(0, -1, 1u8), (1, 0, 2), (0, 1, 4), (-1, 0, 8)] {
            let differs = mgr
                .tile(col + dx, row + dy)
                .is_some_and(|n| n != centre);
            assert_eq!(mask & bit != 0, differs, "({col}, {row}) bit {bit}");
        }
    }
}
