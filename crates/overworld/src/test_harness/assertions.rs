//! Assertion helpers for `TestWorld` integration tests.

use crate::coords::ChunkCoord;
use crate::generator::dead_end_trees;
use crate::tile::TileKind;

use super::TestWorld;

impl TestWorld {
    /// Assert the tile at `(col, row)` is loaded and equals `expected`.
    pub fn assert_tile(&self, col: i32, row: i32, expected: TileKind) {
        let found = self.tile(col, row);
        assert_eq!(
            found,
            Some(expected),
            "Expected {expected} at ({col}, {row}), found {found:?}"
        );
    }

    pub fn assert_fog(&self, col: i32, row: i32) {
        assert!(
            self.manager().is_fog(col, row),
            "Expected fog at ({col}, {row})"
        );
    }

    /// Assert every chunk in the home pin radius is resident.
    pub fn assert_home_pinned(&self) {
        let mgr = self.manager();
        for coord in mgr.home_chunk().square(mgr.config().home_pin_radius) {
            assert!(mgr.is_loaded(coord), "Pinned chunk {coord} is not loaded");
        }
    }

    /// Assert the resident set respects the unload window plus the pinned set.
    pub fn assert_within_memory_bound(&self) {
        let mgr = self.manager();
        let bound = mgr.config().max_resident_chunks();
        let loaded = mgr.loaded_chunk_count();
        assert!(
            loaded <= bound,
            "Expected at most {bound} loaded chunks, got {loaded}"
        );
    }

    /// Assert every loaded, non-pinned chunk is inside the unload radius of
    /// the player's chunk.
    pub fn assert_no_stale_chunks(&self) {
        let mgr = self.manager();
        let Some(player) = mgr.player_chunk() else {
            return;
        };
        let radius = mgr.config().unload_radius;
        for coord in mgr.loaded_coords() {
            assert!(
                mgr.is_pinned(coord) || coord.chebyshev(player) <= radius,
                "Chunk {coord} is {} from player chunk {player}",
                coord.chebyshev(player)
            );
        }
    }

    pub fn assert_no_dead_ends(&self, coord: ChunkCoord) {
        let Some(chunk) = self.manager().chunk(coord) else {
            panic!("Chunk {coord} is not loaded");
        };
        let traps = dead_end_trees(chunk);
        assert!(traps.is_empty(), "Chunk {coord} has trapped trees at {traps:?}");
    }
}
