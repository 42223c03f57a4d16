//! Closed tile vocabulary.
//!
//! Each `TileKind` has a lowercase label for persisted state and a one-glyph
//! form for hand-authored layouts and ASCII dumps. Tree, water, mountain and
//! fence block movement.

use serde::{Deserialize, Serialize};

/// Terrain label stored per tile. Rendering and collision interpret the
/// label; the world only stores it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    #[default]
    Grass,
    DarkGrass,
    Dirt,
    Soil,
    SoilWet,
    Water,
    Stone,
    Sand,
    Path,
    Fence,
    Tree,
    Mountain,
    Empty,
}

impl TileKind {
    pub const ALL: [TileKind; 13] = [
        TileKind::Grass,
        TileKind::DarkGrass,
        TileKind::Dirt,
        TileKind::Soil,
        TileKind::SoilWet,
        TileKind::Water,
        TileKind::Stone,
        TileKind::Sand,
        TileKind::Path,
        TileKind::Fence,
        TileKind::Tree,
        TileKind::Mountain,
        TileKind::Empty,
    ];

    /// Tile returned for queries outside the world: the edge is solid rock.
    pub const WALL: TileKind = TileKind::Mountain;

    /// Tiles that stop movement. The dead-end cleanup counts these.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            TileKind::Tree | TileKind::Water | TileKind::Mountain | TileKind::Fence
        )
    }

    /// Lowercase label used by the persisted state.
    pub fn label(self) -> &'static str {
        match self {
            TileKind::Grass => "grass",
            TileKind::DarkGrass => "darkgrass",
            TileKind::Dirt => "dirt",
            TileKind::Soil => "soil",
            TileKind::SoilWet => "soilwet",
            TileKind::Water => "water",
            TileKind::Stone => "stone",
            TileKind::Sand => "sand",
            TileKind::Path => "path",
            TileKind::Fence => "fence",
            TileKind::Tree => "tree",
            TileKind::Mountain => "mountain",
            TileKind::Empty => "empty",
        }
    }

    pub fn from_label(label: &str) -> Option<TileKind> {
        TileKind::ALL.into_iter().find(|t| t.label() == label)
    }

    /// One-character glyph used by ASCII dumps and hand-authored layouts.
    pub fn glyph(self) -> char {
        match self {
            TileKind::Grass => '.',
            TileKind::DarkGrass => ',',
            TileKind::Dirt => ':',
            TileKind::Soil => 's',
            TileKind::SoilWet => 'w',
            TileKind::Water => '~',
            TileKind::Stone => 'o',
            TileKind::Sand => '_',
            TileKind::Path => '=',
            TileKind::Fence => '#',
            TileKind::Tree => 'T',
            TileKind::Mountain => '^',
            TileKind::Empty => ' ',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<TileKind> {
        TileKind::ALL.into_iter().find(|t| t.glyph() == glyph)
    }
}

impl std::fmt::Display for TileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
