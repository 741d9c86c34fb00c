//! Error types for code generation

use thiserror::Error;

/// Errors that can occur while building code and its source map
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// A required construction option was not supplied
    #[error("options.{option} is required")]
    MissingOption { option: &'static str },

    /// A UTF-16 offset does not resolve inside the original source
    #[error(
        "offset {offset} is outside the original source ({length} UTF-16 units) or splits a surrogate pair"
    )]
    OffsetOutOfBounds { offset: usize, length: usize },

    /// A location does not exist in the original source
    #[error("location {line}:{column} does not exist in the original source")]
    LocationOutOfBounds { line: u32, column: u32 },

    /// Shifting a fragment would move a coordinate past `u32::MAX`
    #[error("shifting {coordinate} {value} by {offset} overflows")]
    CoordinateOverflow {
        coordinate: &'static str,
        value: u32,
        offset: u32,
    },

    /// A source map could not be decoded or encoded
    #[error("malformed source map: {0}")]
    Decode(#[from] sourcemap::Error),

    /// A source map references entries its own tables do not contain
    #[error("invalid source map: {reason}")]
    InvalidSourceMap { reason: String },

    /// Source map JSON could not be read or written
    #[error("source map JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
