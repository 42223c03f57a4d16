//! ASCII views of the chunk world for logs and tests.
//!
//! - **Chunk overview**: one character per chunk of the full world, showing
//!   which chunks are loaded, pinned or under the player.
//! - **Detail**: one glyph per tile over a rectangle; unloaded tiles print
//!   as [`FOG_CHAR`].
//!
//! Both are built on demand from `&ChunkManager`.

use crate::chunk_manager::ChunkManager;
use crate::config::CHUNK_SIZE;
use crate::coords::{ChunkCoord, TileRect};
use crate::tile::TileKind;

/// Printed for tiles whose chunk is not loaded.
pub const FOG_CHAR: char = '?';

const ROW_LABEL_WIDTH: usize = 7; // "XXXX | "

pub fn tile_char(tile: Option<TileKind>) -> char {
    tile.map(TileKind::glyph).unwrap_or(FOG_CHAR)
}

// -----------------------------------------------------------------------
// Chunk overview
// -----------------------------------------------------------------------

/// Character for one chunk in the overview.
fn chunk_char(manager: &ChunkManager, coord: ChunkCoord) -> char {
    if manager.player_chunk() == Some(coord) {
        '@'
    } else if manager.is_loaded(coord) && manager.is_pinned(coord) {
        'H'
    } else if manager.is_loaded(coord) {
        '#'
    } else {
        '.'
    }
}

/// One character per chunk over the full world bounds, with a legend.
pub fn build_chunk_overview(manager: &ChunkManager) -> String {
    let bounds = manager.full_world_bounds();
    let size = CHUNK_SIZE as i32;
    let min_cx = bounds.min_col.div_euclid(size);
    let min_cy = bounds.min_row.div_euclid(size);
    let max_cx = bounds.max_col.div_euclid(size);
    let max_cy = bounds.max_row.div_euclid(size);

    let mut lines = Vec::with_capacity((max_cy - min_cy + 1) as usize + 3);
    for cy in min_cy..=max_cy {
        let mut line = format!("{cy:>4} | ");
        for cx in min_cx..=max_cx {
            line.push(chunk_char(manager, ChunkCoord::new(cx, cy)));
        }
        lines.push(line);
    }
    lines.push(String::new());
    lines.push("Legend: @ player  H pinned  # loaded  . unloaded".to_string());
    lines.join("\n")
}

// -----------------------------------------------------------------------
// Detail map
// -----------------------------------------------------------------------

/// Rows of glyphs for `rect`, without headers.
pub fn render_rows(manager: &ChunkManager, rect: TileRect) -> Vec<String> {
    (rect.min_row..=rect.max_row)
        .map(|row| {
            (rect.min_col..=rect.max_col)
                .map(|col| tile_char(manager.tile(col, row)))
                .collect()
        })
        .collect()
}

/// Full-resolution map of `rect` with row labels and a column ruler.
pub fn build_detail_map(manager: &ChunkManager, rect: TileRect) -> String {
    let mut lines = Vec::with_capacity(rect.height() as usize + 1);
    lines.push(column_ruler(rect.min_col, rect.width()));
    for (row, glyphs) in (rect.min_row..).zip(render_rows(manager, rect)) {
        lines.push(format!("{row:>4} | {glyphs}"));
    }
    lines.join("\n")
}

/// Detail map of everything loaded, or a note when nothing is.
pub fn build_loaded_map(manager: &ChunkManager) -> String {
    match manager.world_bounds() {
        Some(rect) => build_detail_map(manager, rect),
        None => "(no chunks loaded)".to_string(),
    }
}

/// Column labels every chunk width, aligned past the row labels.
fn column_ruler(min_col: i32, width: i32) -> String {
    let mut header = " ".repeat(ROW_LABEL_WIDTH);
    let mut offset = 0;
    while offset < width {
        let col = min_col + offset;
        if col.rem_euclid(CHUNK_SIZE as i32) == 0 || offset == 0 {
            let label = col.to_string();
            offset += label.len() as i32;
            header.push_str(&label);
        } else {
            header.push(' ');
            offset += 1;
        }
    }
    header.trim_end().to_string()
}
