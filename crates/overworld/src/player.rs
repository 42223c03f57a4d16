use bevy::prelude::*;

use crate::coords::TilePos;

/// Anything that can report where the player stands, in world tiles.
pub trait PlayerPositionProvider {
    /// `None` until the player has been placed.
    fn player_tile(&self) -> Option<TilePos>;
}

/// Player position written by the host once per frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTile {
    pub position: Option<TilePos>,
}

impl PlayerTile {
    pub fn at(col: i32, row: i32) -> Self {
        Self {
            position: Some(TilePos::new(col, row)),
        }
    }

    pub fn set(&mut self, col: i32, row: i32) {
        self.position = Some(TilePos::new(col, row));
    }
}

impl PlayerPositionProvider for PlayerTile {
    fn player_tile(&self) -> Option<TilePos> {
        self.position
    }
}
