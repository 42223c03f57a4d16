//! World, chunk and local tile coordinates.
//!
//! World tiles are addressed by `TilePos { col, row }`. A chunk covers
//! `CHUNK_SIZE x CHUNK_SIZE` tiles; conversions use floored division and
//! floored modulus so negative world coordinates map to the chunk that
//! actually contains them (`-1` lives in chunk `-1` at local `15`).

use serde::{Deserialize, Serialize};

use crate::config::CHUNK_SIZE;

const CHUNK: i32 = CHUNK_SIZE as i32;

/// A world tile coordinate.
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
pub struct TilePos {
    pub col: i32,
    pub row: i32,
}

impl TilePos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Chebyshev (king-move) distance in tiles, saturating at `i32::MAX`.
    pub fn chebyshev(self, other: TilePos) -> i32 {
        axis_distance(self.col, other.col).max(axis_distance(self.row, other.row))
    }
}

/// Coordinate of a chunk in chunk units.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// World tile of this chunk's local `(0, 0)`. Chunks past the edge of
    /// the `i32` tile space clamp to it.
    pub fn origin(self) -> TilePos {
        TilePos::new(self.cx.saturating_mul(CHUNK), self.cy.saturating_mul(CHUNK))
    }

    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        axis_distance(self.cx, other.cx).max(axis_distance(self.cy, other.cy))
    }

    /// All chunks in the `(2r+1)^2` square centred here, row by row.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        (-radius..=radius).flat_map(move |dy| {
            (-radius..=radius).map(move |dx| ChunkCoord::new(self.cx + dx, self.cy + dy))
        })
    }

    /// Persistence key, `"cx,cy"`.
    pub fn key(self) -> String {
        format!("{},{}", self.cx, self.cy)
    }

    pub fn from_key(key: &str) -> Option<ChunkCoord> {
        let (cx, cy) = key.split_once(',')?;
        Some(ChunkCoord::new(
            cx.trim().parse().ok()?,
            cy.trim().parse().ok()?,
        ))
    }

    /// Tile rectangle covered by this chunk.
    pub fn tile_rect(self) -> TileRect {
        let origin = self.origin();
        TileRect {
            min_col: origin.col,
            min_row: origin.row,
            max_col: origin.col.saturating_add(CHUNK - 1),
            max_row: origin.row.saturating_add(CHUNK - 1),
        }
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.cx, self.cy)
    }
}

/// Tile position inside a chunk, both components in `0..CHUNK_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LocalPos {
    pub lx: usize,
    pub ly: usize,
}

impl LocalPos {
    pub const fn new(lx: usize, ly: usize) -> Self {
        Self { lx, ly }
    }

    /// Row-major index into a chunk's tile vector.
    #[inline]
    pub fn index(self) -> usize {
        self.ly * CHUNK_SIZE + self.lx
    }
}

/// Inclusive tile rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub min_col: i32,
    pub min_row: i32,
    pub max_col: i32,
    pub max_row: i32,
}

impl TileRect {
    #[inline]
    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= self.min_col && col <= self.max_col && row >= self.min_row && row <= self.max_row
    }

    /// Smallest rectangle covering both.
    pub fn union(self, other: TileRect) -> TileRect {
        TileRect {
            min_col: self.min_col.min(other.min_col),
            min_row: self.min_row.min(other.min_row),
            max_col: self.max_col.max(other.max_col),
            max_row: self.max_row.max(other.max_row),
        }
    }

    pub fn width(&self) -> i32 {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> i32 {
        self.max_row - self.min_row + 1
    }
}

#[inline]
pub fn world_to_chunk(col: i32, row: i32) -> ChunkCoord {
    ChunkCoord::new(col.div_euclid(CHUNK), row.div_euclid(CHUNK))
}

#[inline]
pub fn world_to_local(col: i32, row: i32) -> LocalPos {
    LocalPos::new(
        col.rem_euclid(CHUNK) as usize,
        row.rem_euclid(CHUNK) as usize,
    )
}

#[inline]
pub fn local_to_world(chunk: ChunkCoord, local: LocalPos) -> TilePos {
    let origin = chunk.origin();
    TilePos::new(
        origin.col.saturating_add(local.lx as i32),
        origin.row.saturating_add(local.ly as i32),
    )
}

fn axis_distance(a: i32, b: i32) -> i32 {
    i32::try_from(a.abs_diff(b)).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_one_is_last_tile_of_negative_chunk() {
        assert_eq!(world_to_chunk(-1, -1), ChunkCoord::new(-1, -1));
        assert_eq!(world_to_local(-1, -1), LocalPos::new(15, 15));
    }

    #[test]
    fn test_chunk_boundaries() {
        assert_eq!(world_to_chunk(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(world_to_chunk(15, 15), ChunkCoord::new(0, 0));
        assert_eq!(world_to_chunk(16, 31), ChunkCoord::new(1, 1));
        assert_eq!(world_to_chunk(-16, -17), ChunkCoord::new(-1, -2));
        assert_eq!(world_to_local(-16, -17), LocalPos::new(0, 15));
    }

    #[test]
    fn test_roundtrip_small_range() {
        for col in -40..40 {
            for row in -40..40 {
                let chunk = world_to_chunk(col, row);
                let local = world_to_local(col, row);
                assert_eq!(chunk.cx * CHUNK + local.lx as i32, col);
                assert_eq!(chunk.cy * CHUNK + local.ly as i32, row);
                assert_eq!(local_to_world(chunk, local), TilePos::new(col, row));
            }
        }
    }

    #[test]
    fn test_chunk_key_roundtrip() {
        for coord in [
            ChunkCoord::new(0, 0),
            ChunkCoord::new(8, 8),
            ChunkCoord::new(-3, 12),
        ] {
            assert_eq!(ChunkCoord::from_key(&coord.key()), Some(coord));
        }
        assert_eq!(ChunkCoord::new(-3, 12).key(), "-3,12");
    }

    #[test]
    fn test_chunk_key_rejects_garbage() {
        assert_eq!(ChunkCoord::from_key(""), None);
        assert_eq!(ChunkCoord::from_key("3"), None);
        assert_eq!(ChunkCoord::from_key("a,b"), None);
        assert_eq!(ChunkCoord::from_key("1,2,3"), None);
    }

    #[test]
    fn test_square_visits_every_chunk_once() {
        let centre = ChunkCoord::new(5, -2);
        let coords: Vec<ChunkCoord> = centre.square(2).collect();
        assert_eq!(coords.len(), 25);
        let unique: std::collections::HashSet<_> = coords.iter().copied().collect();
        assert_eq!(unique.len(), 25);
        assert!(coords.iter().all(|c| c.chebyshev(centre) <= 2));
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let far = world_to_chunk(i32::MAX, i32::MIN);
        assert_eq!(far, ChunkCoord::new(134_217_727, -134_217_728));
        assert_eq!(far.origin(), TilePos::new(i32::MAX - 15, i32::MIN));
        assert_eq!(local_to_world(far, LocalPos::new(15, 0)), TilePos::new(i32::MAX, i32::MIN));

        // One chunk past the last whole chunk clamps to the edge of tile space.
        let beyond = ChunkCoord::new(134_217_729, -134_217_730);
        assert_eq!(beyond.origin(), TilePos::new(i32::MAX, i32::MIN));
        let rect = beyond.tile_rect();
        assert_eq!((rect.max_col, rect.max_row), (i32::MAX, i32::MIN + 15));

        let a = TilePos::new(i32::MIN, 0);
        let b = TilePos::new(i32::MAX, 0);
        assert_eq!(a.chebyshev(b), i32::MAX);
        assert_eq!(
            ChunkCoord::new(i32::MIN, 0).chebyshev(ChunkCoord::new(i32::MAX, 0)),
            i32::MAX
        );
    }

    #[test]
    fn test_tile_rect() {
        let rect = ChunkCoord::new(1, -1).tile_rect();
        assert_eq!((rect.min_col, rect.min_row), (16, -16));
        assert_eq!((rect.max_col, rect.max_row), (31, -1));
        assert_eq!(rect.width(), 16);
        assert!(rect.contains(20, -5));
        assert!(!rect.contains(32, -5));
    }
}
