//! Persistence through the `Saveable` extension map and the JSON state shape.

use crate::config::{BoundsMode, WorldConfig};
use crate::coords::{ChunkCoord, TilePos};
use crate::test_harness::TestWorld;
use crate::tile::TileKind;
use crate::world_state::{WorldState, CURRENT_WORLD_STATE_VERSION};
use crate::{ChunkManager, Saveable};

#[test]
fn extension_map_roundtrip_keeps_farm_edits() {
    let mut world = TestWorld::new();
    let pos = world.manager().farm_to_world(7, 6);
    world
        .manager_mut()
        .set_tile(pos.col, pos.row, TileKind::SoilWet);
    world.manager_mut().set_unlock_tokens(6);
    world.walk_to(30, 30);

    let extensions = world.save_extensions();
    assert!(extensions.contains_key(ChunkManager::SAVE_KEY));

    let mut restored = TestWorld::new();
    restored.load_extensions(&extensions);
    restored.assert_tile(pos.col, pos.row, TileKind::SoilWet);
    restored.assert_home_pinned();
    assert_eq!(restored.manager().unlock_tokens(), 6);
    // Only home chunks were persisted; the far window regenerates on demand.
    assert_eq!(restored.loaded_count(), 9);
}

#[test]
fn saved_state_regenerates_identically_elsewhere() {
    let mut world = TestWorld::new();
    world.walk_to(60, 60);
    let before: Vec<Option<TileKind>> = (48..80).map(|c| world.tile(c, 60)).collect();

    let extensions = world.save_extensions();
    let mut restored = TestWorld::new();
    restored.load_extensions(&extensions);
    restored.walk_to(60, 60);
    let after: Vec<Option<TileKind>> = (48..80).map(|c| restored.tile(c, 60)).collect();
    assert_eq!(before, after);
}

#[test]
fn corrupt_bytes_fall_back_to_a_fresh_world() {
    let manager = ChunkManager::load_from_bytes(&[0xff, 0x00, 0x13]);
    assert_eq!(manager.loaded_chunk_count(), 9);
    assert_eq!(manager.home_offset(), TilePos::new(128, 128));
    assert_eq!(manager.tile(128, 128), Some(TileKind::Fence));
}

#[test]
fn empty_manager_skips_saving() {
    assert!(ChunkManager::default().save_to_bytes().is_none());
}

#[test]
fn json_state_roundtrip() {
    let world = TestWorld::new();
    let state = world.manager().state();
    let json = serde_json::to_string(&state).unwrap();
    let parsed: WorldState = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, state);

    let mut fresh = ChunkManager::default();
    let report = fresh.load_state(parsed).unwrap();
    assert_eq!(report.steps_applied, 0);
    assert_eq!(fresh.state(), state);
}

#[test]
fn legacy_json_state_is_migrated() {
    // Unversioned state: one home-adjacent chunk with a stray fence at its
    // origin and a farm fence corner in the home chunk.
    let mut west = vec![vec!["grass"; 16]; 16];
    west[0][0] = "fence";
    let mut home = vec![vec!["grass"; 16]; 16];
    home[0][0] = "fence";
    let json = serde_json::json!({
        "chunks": {
            "7,8": { "tiles": west, "generated": true },
            "8,8": { "tiles": home, "generated": true }
        },
        "homeOffset": { "col": 128, "row": 128 },
        "lastUnlockTokens": 2
    });
    let state: WorldState = serde_json::from_value(json).unwrap();
    assert_eq!(state.version, 0);

    let mut manager = ChunkManager::default();
    let report = manager.load_state(state).unwrap();
    assert_eq!(report.original_version, 0);
    assert_eq!(report.final_version, CURRENT_WORLD_STATE_VERSION);
    assert_eq!(manager.tile(112, 128), Some(TileKind::Tree));
    assert_eq!(manager.tile(128, 128), Some(TileKind::Fence));
    assert_eq!(manager.unlock_tokens(), 2);
    assert!(manager.is_loaded(ChunkCoord::new(7, 8)));
    assert_eq!(manager.state().version, CURRENT_WORLD_STATE_VERSION);
}

#[test]
fn seeded_world_reloads_identically() {
    let config = WorldConfig {
        seed: 7,
        ..WorldConfig::default()
    };
    let mut world = TestWorld::with_config(config.clone());
    world.walk_to(60, 60);
    let coord = ChunkCoord::new(3, 3);
    let before = world.manager().chunk(coord).cloned();
    assert!(before.is_some());

    let extensions = world.save_extensions();
    let mut restored = TestWorld::new();
    restored.load_extensions(&extensions);
    assert_eq!(restored.manager().config(), &config);

    restored.walk_to(60, 60);
    assert_eq!(restored.manager().chunk(coord).cloned(), before);
    assert_eq!(restored.world().resource::<WorldConfig>(), &config);
}

#[test]
fn expanding_world_reloads_as_expanding() {
    let config = WorldConfig {
        seed: 7,
        bounds_mode: BoundsMode::Expanding,
        ..WorldConfig::default()
    };
    let mut world = TestWorld::with_config(config);
    world.walk_to(-40, -40);
    let before: Vec<Option<TileKind>> = (-48..-32).map(|c| world.tile(c, -40)).collect();

    let extensions = world.save_extensions();
    let mut restored = TestWorld::new();
    restored.load_extensions(&extensions);
    restored.walk_to(-40, -40);
    assert_eq!(
        restored.manager().config().bounds_mode,
        BoundsMode::Expanding
    );
    let after: Vec<Option<TileKind>> = (-48..-32).map(|c| restored.tile(c, -40)).collect();
    assert_eq!(before, after);
    assert_ne!(restored.tile(-40, -40), Some(TileKind::Mountain));
}

#[test]
fn legacy_json_without_home_offset_keeps_farm_fence() {
    let mut home = vec![vec!["grass"; 16]; 16];
    home[0][0] = "fence";
    for json in [
        serde_json::json!({ "chunks": { "8,8": { "tiles": home } } }),
        serde_json::json!({
            "chunks": { "8,8": { "tiles": home } },
            "homeOffset": { "col": 40, "row": 40 }
        }),
    ] {
        let state: WorldState = serde_json::from_value(json).unwrap();
        assert_eq!(state.version, 0);

        let mut manager = ChunkManager::default();
        manager.load_state(state).unwrap();
        assert_eq!(manager.tile(128, 128), Some(TileKind::Fence));
        assert_eq!(manager.home_offset(), TilePos::new(128, 128));
        assert_eq!(manager.state().home_offset, TilePos::new(128, 128));
    }
}
