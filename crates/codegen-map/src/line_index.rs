//! Line index for offset <-> location lookups

use crate::types::Location;

/// Line start table over a piece of text
///
/// Offsets handed to and returned from [`location_for_index`] and
/// [`index_for_location`] count UTF-16 code units, like string indices in
/// the tools that consume source maps. [`byte_offset`] gives the matching
/// byte offset for slicing.
///
/// The index stores line starts only, so every lookup takes the text it was
/// built from. It can be extended in place as text is appended, which keeps
/// lookups on a growing output buffer cheap.
///
/// [`location_for_index`]: LineIndex::location_for_index
/// [`index_for_location`]: LineIndex::index_for_location
/// [`byte_offset`]: LineIndex::byte_offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset at which each line starts; the first entry is always 0
    line_starts: Vec<usize>,

    /// UTF-16 offset at which each line starts, aligned with `line_starts`
    unit_starts: Vec<usize>,

    /// Total length of the indexed text in bytes
    total_length: usize,

    /// Total length of the indexed text in UTF-16 code units
    total_units: usize,
}

impl LineIndex {
    /// Build an index over `content`
    ///
    /// # Example
    ///
    /// ```
    /// use codegen_map::{LineIndex, Location};
    ///
    /// let text = "hello\nworld";
    /// let index = LineIndex::new(text);
    /// assert_eq!(index.location_for_index(text, 6), Some(Location::new(1, 0)));
    /// ```
    pub fn new(content: &str) -> Self {
        let mut index = LineIndex {
            line_starts: vec![0],
            unit_starts: vec![0],
            total_length: 0,
            total_units: 0,
        };
        index.push_str(content);
        index
    }

    /// Extend the index with text appended to the end of the indexed text
    pub fn push_str(&mut self, appended: &str) {
        let base = self.total_length;
        if appended.is_ascii() {
            let base_units = self.total_units;
            for (idx, _) in appended.match_indices('\n') {
                self.line_starts.push(base + idx + 1);
                self.unit_starts.push(base_units + idx + 1);
            }
            self.total_units += appended.len();
        } else {
            let mut units = self.total_units;
            for (idx, ch) in appended.char_indices() {
                units += ch.len_utf16();
                if ch == '\n' {
                    self.line_starts.push(base + idx + 1);
                    self.unit_starts.push(units);
                }
            }
            self.total_units = units;
        }
        self.total_length += appended.len();
    }

    /// Total length of the indexed text in bytes
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Total length of the indexed text in UTF-16 code units
    pub fn utf16_length(&self) -> usize {
        self.total_units
    }

    /// Number of lines; a text with `n` newlines has `n + 1` lines
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset at which `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset just before the newline ending `line`, or the end of text
    fn line_end(&self, line: usize) -> usize {
        self.line_starts
            .get(line + 1)
            .map_or(self.total_length, |next| next - 1)
    }

    /// Convert a UTF-16 offset to a location
    ///
    /// Returns None if the offset is past the end of the text or falls
    /// between the two halves of a surrogate pair.
    pub fn location_for_index(&self, content: &str, index: usize) -> Option<Location> {
        if index > self.total_units {
            return None;
        }

        // unit_starts[0] == 0, so Err(0) cannot happen
        let line = match self.unit_starts.binary_search(&index) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let location = Location {
            line: u32::try_from(line).ok()?,
            column: u32::try_from(index - self.unit_starts[line]).ok()?,
        };

        self.byte_offset(content, location)?;
        Some(location)
    }

    /// Convert a location to a UTF-16 offset
    ///
    /// Accepts the same locations as [`LineIndex::byte_offset`].
    pub fn index_for_location(&self, content: &str, location: Location) -> Option<usize> {
        self.byte_offset(content, location)?;
        Some(self.unit_starts[location.line as usize] + location.column as usize)
    }

    /// Convert a location to a byte offset
    ///
    /// The column may point one past the last character of the line. Returns
    /// None for lines that do not exist, columns past the end of the line and
    /// columns splitting a surrogate pair.
    pub fn byte_offset(&self, content: &str, location: Location) -> Option<usize> {
        debug_assert_eq!(content.len(), self.total_length);
        let line = usize::try_from(location.line).ok()?;
        let start = self.line_start(line)?;
        let end = self.line_end(line);
        let target = usize::try_from(location.column).ok()?;

        let mut units = 0;
        for (idx, ch) in content[start..end].char_indices() {
            if units == target {
                return Some(start + idx);
            }
            units += ch.len_utf16();
            if units > target {
                return None;
            }
        }

        (units == target).then_some(end)
    }

    /// Location of the end of the text
    pub fn end_location(&self, content: &str) -> Location {
        debug_assert_eq!(content.len(), self.total_length);
        let last = self.line_starts.len() - 1;
        let column = self.total_units - self.unit_starts[last];

        Location {
            line: u32::try_from(last).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }
}
