//! Hand-placed points of interest and the prefabs they stamp over terrain.
//!
//! Landmarks are authored content, looked up by exact chunk coordinate. A
//! prefab must fit inside its chunk once its offset is applied; larger
//! authored areas (the home farm) are cut into per-chunk pieces with
//! [`Prefab::split_into_chunks`].

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::config::CHUNK_SIZE;
use crate::coords::{world_to_chunk, world_to_local, ChunkCoord, LocalPos, TilePos};
use crate::home_farm;
use crate::tile::TileKind;
use crate::world_error::WorldError;

/// Rectangular block of authored tiles stamped at a chunk-local offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefab {
    pub offset: LocalPos,
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` entries.
    pub tiles: Vec<TileKind>,
}

impl Prefab {
    pub fn new(offset: LocalPos, width: usize, height: usize, tiles: Vec<TileKind>) -> Self {
        Self {
            offset,
            width,
            height,
            tiles,
        }
    }

    /// Build a prefab from rows of tile glyphs (see [`TileKind::glyph`]).
    pub fn from_glyph_rows(offset: LocalPos, rows: &[&str]) -> Result<Self, WorldError> {
        let (tiles, width, height) = parse_glyph_rows(rows)?;
        Ok(Self::new(offset, width, height, tiles))
    }

    #[inline]
    pub fn tile_at(&self, px: usize, py: usize) -> Option<TileKind> {
        if px < self.width && py < self.height {
            self.tiles.get(py * self.width + px).copied()
        } else {
            None
        }
    }

    /// Chunk-local cells this prefab covers, clipped to the chunk.
    pub fn covers(&self, local: LocalPos) -> bool {
        local.lx >= self.offset.lx
            && local.ly >= self.offset.ly
            && local.lx < self.offset.lx + self.width
            && local.ly < self.offset.ly + self.height
    }

    pub fn validate(&self, landmark: &str) -> Result<(), WorldError> {
        if self.tiles.len() != self.width * self.height {
            return Err(WorldError::InvalidPrefab {
                landmark: landmark.to_string(),
                reason: format!(
                    "{} tiles for a {}x{} prefab",
                    self.tiles.len(),
                    self.width,
                    self.height
                ),
            });
        }
        if self.offset.lx + self.width > CHUNK_SIZE || self.offset.ly + self.height > CHUNK_SIZE {
            return Err(WorldError::InvalidPrefab {
                landmark: landmark.to_string(),
                reason: format!(
                    "offset ({}, {}) + size {}x{} exceeds chunk size {}",
                    self.offset.lx, self.offset.ly, self.width, self.height, CHUNK_SIZE
                ),
            });
        }
        Ok(())
    }

    /// Cut a world-anchored prefab (its `offset` is ignored; `origin` is the
    /// world tile of its top-left cell) into one piece per overlapped chunk.
    pub fn split_into_chunks(&self, origin: TilePos) -> Vec<(ChunkCoord, Prefab)> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let first = world_to_chunk(origin.col, origin.row);
        let last = world_to_chunk(
            origin.col + self.width as i32 - 1,
            origin.row + self.height as i32 - 1,
        );

        let mut pieces = Vec::new();
        for cy in first.cy..=last.cy {
            for cx in first.cx..=last.cx {
                let chunk = ChunkCoord::new(cx, cy);
                let rect = chunk.tile_rect();
                let min_col = rect.min_col.max(origin.col);
                let min_row = rect.min_row.max(origin.row);
                let max_col = rect.max_col.min(origin.col + self.width as i32 - 1);
                let max_row = rect.max_row.min(origin.row + self.height as i32 - 1);

                let width = (max_col - min_col + 1) as usize;
                let height = (max_row - min_row + 1) as usize;
                let mut tiles = Vec::with_capacity(width * height);
                for row in min_row..=max_row {
                    for col in min_col..=max_col {
                        let px = (col - origin.col) as usize;
                        let py = (row - origin.row) as usize;
                        tiles.push(self.tile_at(px, py).unwrap_or_default());
                    }
                }
                pieces.push((
                    chunk,
                    Prefab::new(world_to_local(min_col, min_row), width, height, tiles),
                ));
            }
        }
        pieces
    }
}

/// Parse glyph rows into row-major tiles plus `(width, height)`.
pub fn parse_glyph_rows(rows: &[&str]) -> Result<(Vec<TileKind>, usize, usize), WorldError> {
    let height = rows.len();
    let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
    let mut tiles = Vec::with_capacity(width * height);
    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(WorldError::InvalidLayout(format!(
                "row {y} has {} glyphs, expected {width}",
                row.chars().count()
            )));
        }
        for (x, glyph) in row.chars().enumerate() {
            let tile = TileKind::from_glyph(glyph).ok_or_else(|| {
                WorldError::InvalidLayout(format!("unknown glyph {glyph:?} at ({x}, {y})"))
            })?;
            tiles.push(tile);
        }
    }
    Ok((tiles, width, height))
}

/// A named point of interest bound to one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub chunk: ChunkCoord,
    pub prefab: Option<Prefab>,
    /// Whether `near_landmark` reports it to the interaction layer.
    pub interactable: bool,
}

impl Landmark {
    /// World tile at the centre of the stamped footprint, or of the chunk
    /// when there is no prefab.
    pub fn footprint_center(&self) -> TilePos {
        let origin = self.chunk.origin();
        match &self.prefab {
            Some(prefab) => TilePos::new(
                origin.col + (prefab.offset.lx + prefab.width / 2) as i32,
                origin.row + (prefab.offset.ly + prefab.height / 2) as i32,
            ),
            None => TilePos::new(
                origin.col + (CHUNK_SIZE / 2) as i32,
                origin.row + (CHUNK_SIZE / 2) as i32,
            ),
        }
    }
}

/// Read-only landmark lookup consumed by the generator and chunk manager.
pub trait LandmarkSource: Send + Sync {
    fn landmark_at(&self, chunk: ChunkCoord) -> Option<&Landmark>;

    /// Every landmark, in registration order.
    fn landmarks(&self) -> &[Landmark];
}

/// Landmark table indexed by chunk.
#[derive(Debug, Clone, Default)]
pub struct LandmarkRegistry {
    landmarks: Vec<Landmark>,
    by_chunk: HashMap<ChunkCoord, usize>,
}

impl LandmarkRegistry {
    /// Index `landmarks` by chunk. A second landmark in an already claimed
    /// chunk is kept in the list (so `validate` reports it) but never
    /// stamped.
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        let mut by_chunk = HashMap::with_capacity(landmarks.len());
        for (i, landmark) in landmarks.iter().enumerate() {
            if let Some(&existing) = by_chunk.get(&landmark.chunk) {
                let first: &Landmark = &landmarks[existing];
                warn!(
                    "LandmarkRegistry: '{}' and '{}' share chunk {}; keeping '{}'",
                    first.id, landmark.id, landmark.chunk, first.id
                );
                continue;
            }
            by_chunk.insert(landmark.chunk, i);
        }
        Self {
            landmarks,
            by_chunk,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Check every prefab fits its chunk and no chunk has two landmarks.
    pub fn validate(&self) -> Result<(), WorldError> {
        let mut seen: HashMap<ChunkCoord, &str> = HashMap::new();
        for landmark in &self.landmarks {
            if let Some(first) = seen.insert(landmark.chunk, &landmark.id) {
                return Err(WorldError::DuplicateLandmark {
                    chunk: landmark.chunk,
                    first: first.to_string(),
                    second: landmark.id.clone(),
                });
            }
            if let Some(prefab) = &landmark.prefab {
                prefab.validate(&landmark.id)?;
            }
        }
        Ok(())
    }

    /// The shipped world: the home farm around `home_chunk` plus the
    /// hand-placed points of interest.
    pub fn standard(home_chunk: ChunkCoord) -> Self {
        let mut landmarks = home_farm::home_farm_landmarks(home_chunk);
        landmarks.extend(points_of_interest());
        Self::new(landmarks)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Distinct chunks that carry a landmark.
    pub fn chunks(&self) -> HashSet<ChunkCoord> {
        self.by_chunk.keys().copied().collect()
    }
}

impl LandmarkSource for LandmarkRegistry {
    fn landmark_at(&self, chunk: ChunkCoord) -> Option<&Landmark> {
        self.by_chunk.get(&chunk).map(|&i| &self.landmarks[i])
    }

    fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }
}

// ---------------------------------------------------------------------------
// Authored points of interest
// ---------------------------------------------------------------------------

struct PoiDef {
    id: &'static str,
    name: &'static str,
    chunk: (i32, i32),
    offset: (usize, usize),
    rows: &'static [&'static str],
}

const POINTS_OF_INTEREST: &[PoiDef] = &[
    PoiDef {
        id: "old_well",
        name: "Old Well",
        chunk: (6, 5),
        offset: (6, 6),
        rows: &["ooo", "o~o", "ooo"],
    },
    PoiDef {
        id: "fishing_pond",
        name: "Fishing Pond",
        chunk: (11, 10),
        offset: (4, 5),
        rows: &["_~~~~_", "~~~~~~", "~~~~~~", "_~~~~_", "__==__"],
    },
    PoiDef {
        id: "standing_stones",
        name: "Standing Stones",
        chunk: (4, 11),
        offset: (5, 5),
        rows: &["o...o", ".....", "..o..", ".....", "o...o"],
    },
    PoiDef {
        id: "desert_oasis",
        name: "Desert Oasis",
        chunk: (13, 8),
        offset: (5, 6),
        rows: &["__T__", "_~~~_", "_~~~T", "_____"],
    },
    PoiDef {
        id: "signpost",
        name: "Crossroads Signpost",
        chunk: (8, 5),
        offset: (0, 0),
        rows: &[],
    },
];

fn points_of_interest() -> Vec<Landmark> {
    POINTS_OF_INTEREST
        .iter()
        .map(|def| {
            let prefab = if def.rows.is_empty() {
                None
            } else {
                let offset = LocalPos::new(def.offset.0, def.offset.1);
                match Prefab::from_glyph_rows(offset, def.rows) {
                    Ok(prefab) => Some(prefab),
                    Err(e) => {
                        warn!("Landmark '{}' dropped its prefab: {}", def.id, e);
                        None
                    }
                }
            };
            Landmark {
                id: def.id.to_string(),
                name: def.name.to_string(),
                chunk: ChunkCoord::new(def.chunk.0, def.chunk.1),
                prefab,
                interactable: true,
            }
        })
        .collect()
}
