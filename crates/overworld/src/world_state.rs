// ---------------------------------------------------------------------------
// WorldState: persisted shape of the chunk world
// ---------------------------------------------------------------------------
//
// Only chunks within the pinned home radius are written; everything else
// regenerates identically from the seed. Tiles are stored as lowercase labels
// (not `TileKind`) so migrations can rewrite labels that no longer exist in
// the current vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::config::{WorldConfig, CHUNK_SIZE};
use crate::coords::TilePos;
use crate::tile::TileKind;
use crate::world_error::WorldError;

/// Schema version written by this build.
///
/// v0: unversioned legacy states.
/// v1: explicit `version`; stray fences outside the farm are trees.
/// v2: the `WorldConfig` the world was generated with.
pub const CURRENT_WORLD_STATE_VERSION: u32 = 2;

/// First version whose `config` field is meaningful.
pub const CONFIG_RECORDED_VERSION: u32 = 2;

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    /// Missing in legacy states, which therefore read as v0.
    #[serde(default)]
    pub version: u32,
    /// Keyed by `"cx,cy"`.
    #[serde(default)]
    pub chunks: BTreeMap<String, SavedChunk>,
    #[serde(default)]
    pub home_offset: TilePos,
    #[serde(default)]
    pub last_unlock_tokens: u32,
    /// Seed, bounds and radii that regenerate every chunk not stored here.
    /// Missing before v2, where it reads as the default config.
    #[serde(default)]
    pub config: WorldConfig,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct SavedChunk {
    /// `CHUNK_SIZE` rows of `CHUNK_SIZE` tile labels.
    pub tiles: Vec<Vec<String>>,
    #[serde(default = "default_generated")]
    pub generated: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_generated() -> bool {
    true
}

impl SavedChunk {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            tiles: chunk
                .rows()
                .map(|row| row.iter().map(|t| t.label().to_string()).collect())
                .collect(),
            generated: chunk.generated,
            locked: chunk.locked,
        }
    }

    /// Row-major tiles; `None` where a label is not in the current vocabulary.
    pub fn parse_tiles(&self, key: &str) -> Result<Vec<Option<TileKind>>, WorldError> {
        let well_formed =
            self.tiles.len() == CHUNK_SIZE && self.tiles.iter().all(|row| row.len() == CHUNK_SIZE);
        if !well_formed {
            return Err(WorldError::InvalidChunkShape {
                key: key.to_string(),
                rows: self.tiles.len(),
            });
        }
        Ok(self
            .tiles
            .iter()
            .flatten()
            .map(|label| TileKind::from_label(label))
            .collect())
    }
}
