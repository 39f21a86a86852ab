//! Error types shared by every grove operation.

use thiserror::Error;

/// Errors that can occur while building, resolving or rendering a generation.
#[derive(Error, Debug)]
pub enum GroveError {
    /// Raw weights did not sum to 1 within tolerance.
    #[error("weights do not sum to 1 (sum = {sum})")]
    InvalidWeights {
        /// Sum of the supplied weights.
        sum: f64,
    },

    /// A distribution with no options, or with no positive weight.
    #[error("distribution has no selectable options")]
    EmptyDistribution,

    /// A quirk probability outside `[0, 1]`.
    #[error("quirk '{quirk}' has probability {value}, expected a value in [0, 1]")]
    InvalidProbability {
        /// Quirk key.
        quirk: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Floor index past the end of the floor table.
    #[error("level {level} not found ({floors} floors defined)")]
    LevelNotFound {
        /// Requested level.
        level: usize,
        /// Number of floors in the table.
        floors: usize,
    },

    /// A selected name is missing from an asset pool.
    #[error("'{key}' not found in {pool}")]
    AssetNotFound {
        /// Pool that was searched (e.g. "heightmap_templates").
        pool: &'static str,
        /// Name that was looked up.
        key: String,
    },

    /// A biome record lacks one of its pools.
    #[error("biome '{biome}' has no '{field}' entry")]
    MissingBiomeField {
        /// Biome ID.
        biome: String,
        /// Missing top-level key.
        field: &'static str,
    },

    /// Grid dimensions differ from what was expected.
    #[error("shape mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    ShapeMismatch {
        /// Expected (rows, cols).
        expected: (usize, usize),
        /// Actual (rows, cols).
        actual: (usize, usize),
    },

    /// A literal heightmap contained something other than 0-9.
    #[error("invalid digit {found:?} at index {index}")]
    InvalidDigit {
        /// Character position in the source string.
        index: usize,
        /// The offending character.
        found: char,
    },

    /// A color string that is not `#rrggbb`.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A string that is not a hyphenated UUID.
    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    /// IO error (file not found, permissions, etc.)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding or encoding failure.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for grove operations.
pub type GroveResult<T> = Result<T, GroveError>;
