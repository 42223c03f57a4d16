//! A single chunk: a row-major `CHUNK_SIZE x CHUNK_SIZE` tile grid plus
//! its generated/locked flags.

use crate::config::{CHUNK_AREA, CHUNK_SIZE};
use crate::coords::{ChunkCoord, LocalPos};
use crate::tile::TileKind;

/// One loaded `CHUNK_SIZE x CHUNK_SIZE` block of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    /// Row-major, `CHUNK_AREA` entries.
    pub tiles: Vec<TileKind>,
    pub generated: bool,
    /// Legacy flag from the unlockable-region variant. Never set by the
    /// generator but carried through persistence.
    pub locked: bool,
}

impl Chunk {
    /// A chunk filled with one tile kind, not yet marked generated.
    pub fn filled(coord: ChunkCoord, kind: TileKind) -> Self {
        Self {
            coord,
            tiles: vec![kind; CHUNK_AREA],
            generated: false,
            locked: false,
        }
    }

    #[inline]
    pub fn get(&self, local: LocalPos) -> TileKind {
        self.tiles[local.index()]
    }

    #[inline]
    pub fn set(&mut self, local: LocalPos, kind: TileKind) {
        self.tiles[local.index()] = kind;
    }

    /// Tile at `(lx, ly)`, or `None` outside the chunk.
    #[inline]
    pub fn get_checked(&self, lx: i32, ly: i32) -> Option<TileKind> {
        if lx < 0 || ly < 0 || lx >= CHUNK_SIZE as i32 || ly >= CHUNK_SIZE as i32 {
            return None;
        }
        Some(self.get(LocalPos::new(lx as usize, ly as usize)))
    }

    /// Rows of tiles, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[TileKind]> {
        self.tiles.chunks(CHUNK_SIZE)
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&t| t == kind).count()
    }
}
