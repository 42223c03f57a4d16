//! The hand-authored home farm.
//!
//! The farm is fixed tile art placed with its top-left corner on the home
//! offset (the home chunk's origin). At 20x18 it spills into the east, south
//! and south-east neighbours of the home chunk, all of which are pinned.

use bevy::prelude::*;

use crate::config::{HOME_FARM_HEIGHT, HOME_FARM_WIDTH};
use crate::coords::{ChunkCoord, LocalPos};
use crate::landmarks::{Landmark, Prefab};
use crate::tile::TileKind;

/// Farm art, one glyph per tile (see [`TileKind::glyph`]).
pub const HOME_FARM_LAYOUT: [&str; HOME_FARM_HEIGHT] = [
    "####################",
    "#T.......,,......T.#",
    "#..ssssss..ssssss..#",
    "#..ssssss..swwsss..#",
    "#..ssssss..ssssss..#",
    "#..ssssss..ssssss..#",
    "#.........=........#",
    "#.~~~.....=....oo..#",
    "#.~~~.....=....oo..#",
    "#._______.=........#",
    "#==================#",
    "#.........=........#",
    "#.:::::...=..,,,,..#",
    "#.:::::...=..,,T,..#",
    "#.........=........#",
    "#T........=.......T#",
    "#.........=........#",
    "##########=#########",
];

/// Row-major farm tiles. Unknown glyphs become grass.
pub fn home_farm_tiles() -> Vec<TileKind> {
    let mut tiles = Vec::with_capacity(HOME_FARM_WIDTH * HOME_FARM_HEIGHT);
    for (y, row) in HOME_FARM_LAYOUT.iter().enumerate() {
        let mut count = 0;
        for (x, glyph) in row.chars().enumerate().take(HOME_FARM_WIDTH) {
            let tile = TileKind::from_glyph(glyph).unwrap_or_else(|| {
                warn!("Home farm layout: unknown glyph {glyph:?} at ({x}, {y}), using grass");
                TileKind::Grass
            });
            tiles.push(tile);
            count += 1;
        }
        // Pad short rows so the grid stays rectangular.
        tiles.extend(std::iter::repeat(TileKind::Grass).take(HOME_FARM_WIDTH - count));
    }
    tiles
}

/// Farm layout handed to `ChunkManager::init_home` at startup.
///
/// Hosts that ship their own farm art insert this resource before adding
/// the plugin.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct HomeLayout {
    pub tiles: Vec<TileKind>,
    pub width: usize,
    pub height: usize,
}

impl Default for HomeLayout {
    fn default() -> Self {
        Self {
            tiles: home_farm_tiles(),
            width: HOME_FARM_WIDTH,
            height: HOME_FARM_HEIGHT,
        }
    }
}

/// The farm as non-interactable landmarks, one piece per overlapped chunk,
/// so regenerating any pinned chunk reproduces the farm exactly.
pub fn home_farm_landmarks(home_chunk: ChunkCoord) -> Vec<Landmark> {
    let farm = Prefab::new(
        LocalPos::new(0, 0),
        HOME_FARM_WIDTH,
        HOME_FARM_HEIGHT,
        home_farm_tiles(),
    );
    farm.split_into_chunks(home_chunk.origin())
        .into_iter()
        .map(|(chunk, piece)| Landmark {
            id: format!("home_farm_{}_{}", chunk.cx, chunk.cy),
            name: "Home Farm".to_string(),
            chunk,
            prefab: Some(piece),
            interactable: false,
        })
        .collect()
}
