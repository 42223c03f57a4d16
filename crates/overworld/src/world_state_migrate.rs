// ---------------------------------------------------------------------------
// WorldState migrations: ordered, validated chain of label rewrites
// ---------------------------------------------------------------------------
//
// Each step is a function `fn(&mut WorldState)` that moves the state from
// version N to N+1. The registry checks at construction that the chain is
// contiguous, so adding a tile-vocabulary change means adding one step here.
//
// Steps see the state anchored at the loader's home offset, never the one
// stored in the file: legacy states may lack it or disagree with the
// running world.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::config::{WorldConfig, CHUNK_SIZE, HOME_FARM_HEIGHT, HOME_FARM_WIDTH};
use crate::coords::{ChunkCoord, TilePos, TileRect};
use crate::world_error::WorldError;
use crate::world_state::{WorldState, CURRENT_WORLD_STATE_VERSION};

pub(crate) struct MigrationStep {
    pub from_version: u32,
    pub description: &'static str,
    pub migrate_fn: fn(&mut WorldState),
}

/// What the migration chain did to a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub original_version: u32,
    pub final_version: u32,
    pub steps_applied: u32,
    pub step_descriptions: Vec<&'static str>,
}

pub(crate) struct MigrationRegistry {
    steps: Vec<MigrationStep>,
    current_version: u32,
}

impl MigrationRegistry {
    /// # Panics
    ///
    /// Panics on duplicate source versions or a gap anywhere in
    /// `0..current_version`.
    pub fn new(mut steps: Vec<MigrationStep>, current_version: u32) -> Self {
        let mut seen = HashSet::new();
        for step in &steps {
            assert!(
                seen.insert(step.from_version),
                "Duplicate world state migration for v{}",
                step.from_version
            );
        }
        for v in 0..current_version {
            assert!(
                seen.contains(&v),
                "Missing world state migration from v{} to v{}",
                v,
                v + 1
            );
        }
        steps.sort_by_key(|s| s.from_version);
        Self {
            steps,
            current_version,
        }
    }

    pub fn migrate(&self, state: &mut WorldState) -> Result<MigrationReport, WorldError> {
        let original_version = state.version;
        if state.version > self.current_version {
            return Err(WorldError::VersionMismatch {
                expected_max: self.current_version,
                found: state.version,
            });
        }

        let mut steps_applied = 0;
        let mut step_descriptions = Vec::new();
        for step in &self.steps {
            if state.version >= self.current_version {
                break;
            }
            if step.from_version == state.version {
                (step.migrate_fn)(state);
                state.version = step.from_version + 1;
                steps_applied += 1;
                step_descriptions.push(step.description);
            }
        }

        if state.version != self.current_version {
            return Err(WorldError::MigrationFailed(format!(
                "stopped at v{} (target v{})",
                state.version, self.current_version
            )));
        }

        Ok(MigrationReport {
            original_version,
            final_version: state.version,
            steps_applied,
            step_descriptions,
        })
    }

    #[cfg(test)]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

pub(crate) fn build_migration_registry() -> MigrationRegistry {
    let steps = vec![
        MigrationStep {
            from_version: 0,
            description: "Legacy unversioned state: fence outside the farm becomes tree",
            migrate_fn: fence_outside_farm_to_tree,
        },
        MigrationStep {
            from_version: 1,
            description: "Config not recorded: world was generated with the default config",
            migrate_fn: record_default_config,
        },
    ];
    MigrationRegistry::new(steps, CURRENT_WORLD_STATE_VERSION)
}

/// Anchor `state` at `home_offset` and bring it up to
/// [`CURRENT_WORLD_STATE_VERSION`].
pub fn migrate_world_state(
    state: &mut WorldState,
    home_offset: TilePos,
) -> Result<MigrationReport, WorldError> {
    state.home_offset = home_offset;
    build_migration_registry().migrate(state)
}

/// Farm footprint in world tiles for a given home offset.
pub fn farm_footprint(home_offset: TilePos) -> TileRect {
    TileRect {
        min_col: home_offset.col,
        min_row: home_offset.row,
        max_col: home_offset.col + HOME_FARM_WIDTH as i32 - 1,
        max_row: home_offset.row + HOME_FARM_HEIGHT as i32 - 1,
    }
}

/// Old builds scattered fences as procedural obstacles; only the farm's own
/// fence survives.
fn fence_outside_farm_to_tree(state: &mut WorldState) {
    let footprint = farm_footprint(state.home_offset);
    let mut rewritten = 0usize;
    for (key, chunk) in state.chunks.iter_mut() {
        // Unparseable keys are reported and skipped by the loader.
        let Some(coord) = ChunkCoord::from_key(key) else {
            continue;
        };
        let origin = coord.origin();
        for (ly, row) in chunk.tiles.iter_mut().enumerate().take(CHUNK_SIZE) {
            for (lx, label) in row.iter_mut().enumerate().take(CHUNK_SIZE) {
                let col = origin.col + lx as i32;
                let r = origin.row + ly as i32;
                if *label == "fence" && !footprint.contains(col, r) {
                    *label = "tree".to_string();
                    rewritten += 1;
                }
            }
        }
    }
    if rewritten > 0 {
        info!("World state migration: {rewritten} stray fence tiles became trees");
    }
}

fn record_default_config(state: &mut WorldState) {
    state.config = WorldConfig::default();
}
