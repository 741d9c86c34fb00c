//! Relocating fragment segment tables into composite coordinates
//!
//! A fragment map describes text that is about to be appended. Its
//! generated coordinates are relative to the fragment's own first line and
//! its original coordinates are relative to the fragment's declared start in
//! the original source. Only the first line on either side shares a line
//! with preceding content, so column offsets apply to line 0 only while line
//! offsets apply everywhere.
//!
//! Shifts never wrap. A coordinate that would pass `u32::MAX` is an error
//! and leaves the table untouched.

use crate::error::{CodeGenError, Result};
use crate::segment::{SegmentTable, segment_count};
use crate::source_map::SourceMap;
use crate::types::Location;

fn checked(coordinate: &'static str, value: u32, offset: u32) -> Result<u32> {
    value
        .checked_add(offset)
        .ok_or(CodeGenError::CoordinateOverflow {
            coordinate,
            value,
            offset,
        })
}

/// Move every segment's original position by `offset`
///
/// Segments on original line 0 also get `offset.column` added to their
/// original column.
///
/// # Errors
///
/// Fails with [`CodeGenError::CoordinateOverflow`] if any shifted coordinate
/// does not fit in a `u32`.
pub fn shift_original(table: &mut SegmentTable, offset: Location) -> Result<()> {
    // Check everything first so a failure leaves the table as it was
    for original in table.iter().flatten().filter_map(|s| s.original.as_ref()) {
        if original.line == 0 {
            checked("original column", original.column, offset.column)?;
        }
        checked("original line", original.line, offset.line)?;
    }

    for original in table
        .iter_mut()
        .flatten()
        .filter_map(|segment| segment.original.as_mut())
    {
        if original.line == 0 {
            original.column += offset.column;
        }
        original.line += offset.line;
    }
    Ok(())
}

/// Move the table so its first line starts at `offset` in the output
///
/// `offset.line` empty lines are prepended and segments on the fragment's
/// first line get `offset.column` added to their generated column. A table
/// without segments is left untouched.
///
/// # Errors
///
/// Fails with [`CodeGenError::CoordinateOverflow`] if a shifted column or
/// the shifted line count does not fit in a `u32`.
pub fn shift_generated(table: &mut SegmentTable, offset: Location) -> Result<()> {
    if segment_count(table) == 0 {
        return Ok(());
    }

    let last_line = u32::try_from(table.len() - 1).unwrap_or(u32::MAX);
    checked("generated line", last_line, offset.line)?;
    if let Some(first) = table.first() {
        for segment in first {
            checked("generated column", segment.generated_column, offset.column)?;
        }
    }

    let padding = offset.line as usize;
    let mut padded: SegmentTable = Vec::with_capacity(padding + table.len());
    padded.resize_with(padding, Vec::new);
    padded.append(table);
    *table = padded;

    if let Some(first) = table.get_mut(padding) {
        for segment in first {
            segment.generated_column += offset.column;
        }
    }
    Ok(())
}

/// Apply both shifts to an owned table
///
/// # Errors
///
/// Fails if either shift overflows.
pub fn shift_fragment(
    mut table: SegmentTable,
    generated: Location,
    original: Location,
) -> Result<SegmentTable> {
    shift_original(&mut table, original)?;
    shift_generated(&mut table, generated)?;
    Ok(table)
}

/// Decode, shift and re-encode the mappings of `map`
///
/// Sources, contents and names are carried over unchanged.
///
/// # Errors
///
/// Fails if `map` is malformed or a shift overflows.
pub fn shift_mappings(map: &SourceMap, generated: Location, original: Location) -> Result<SourceMap> {
    let table = shift_fragment(map.decoded_mappings()?, generated, original)?;
    let mut shifted =
        SourceMap::from_table(&table, &map.sources, &map.sources_content, &map.names)?;
    shifted.file = map.file.clone();
    shifted.source_root = map.source_root.clone();
    Ok(shifted)
}
