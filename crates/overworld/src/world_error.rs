// ---------------------------------------------------------------------------
// WorldError: typed errors for the few fallible world operations
// ---------------------------------------------------------------------------

use std::fmt;

use crate::coords::ChunkCoord;

/// Errors from loading persisted state and validating authored content.
///
/// Tile queries and edits never fail; they return sentinels instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Persisted state was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// A migration step could not be applied.
    MigrationFailed(String),
    /// A prefab does not fit in its chunk or has the wrong tile count.
    InvalidPrefab { landmark: String, reason: String },
    /// Two landmarks claim the same chunk.
    DuplicateLandmark { chunk: ChunkCoord, first: String, second: String },
    /// A persisted chunk key is not of the form `"cx,cy"`.
    InvalidChunkKey(String),
    /// A persisted chunk grid is not `CHUNK_SIZE x CHUNK_SIZE`.
    InvalidChunkShape { key: String, rows: usize },
    /// A hand-authored glyph layout is ragged or uses an unknown glyph.
    InvalidLayout(String),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: world state is v{found}, but this build only supports up to v{expected_max}"
            ),
            WorldError::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            WorldError::InvalidPrefab { landmark, reason } => {
                write!(f, "Invalid prefab for landmark '{landmark}': {reason}")
            }
            WorldError::DuplicateLandmark {
                chunk,
                first,
                second,
            } => write!(
                f,
                "Landmarks '{first}' and '{second}' are both registered at chunk {chunk}"
            ),
            WorldError::InvalidChunkKey(key) => write!(f, "Invalid chunk key: '{key}'"),
            WorldError::InvalidChunkShape { key, rows } => {
                write!(f, "Chunk '{key}' has a malformed tile grid ({rows} rows)")
            }
            WorldError::InvalidLayout(msg) => write!(f, "Invalid layout: {msg}"),
        }
    }
}

impl std::error::Error for WorldError {}
