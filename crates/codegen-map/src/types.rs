//! Core position types

use serde::{Deserialize, Serialize};

/// A position in text (0-indexed)
///
/// Columns count UTF-16 code units, matching how source map consumers
/// measure columns.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Location {
    /// Line number (0-indexed)
    pub line: u32,
    /// Column number (0-indexed)
    pub column: u32,
}

impl Location {
    pub const fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }
}

/// A position in the original source, either as a location or as an
/// offset into the original source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    /// Offset into the original source text, in UTF-16 code units
    Index(usize),
    /// Line and column in the original source text
    Location(Location),
}

impl From<usize> for Offset {
    fn from(index: usize) -> Self {
        Offset::Index(index)
    }
}

impl From<Location> for Offset {
    fn from(location: Location) -> Self {
        Offset::Location(location)
    }
}
