//! Owned segment tables decoded from `sourcemap` tokens
//!
//! Fragment maps are decoded into a freshly owned table so they can be
//! shifted without touching the caller's map. The outer index of a table is
//! the generated line.

use crate::error::{CodeGenError, Result};

/// Where a segment points to in an original source (all 0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginalPosition {
    /// Index into the map's `sources`
    pub source_index: u32,
    /// Line in the original source
    pub line: u32,
    /// Column in the original source
    pub column: u32,
    /// Index into the map's `names`
    pub name_index: Option<u32>,
}

/// One segment of a generated line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Column in the generated line (0-indexed)
    pub generated_column: u32,
    /// Original position, absent for generated-only segments
    pub original: Option<OriginalPosition>,
}

/// Segments of a single generated line
pub type SegmentLine = Vec<Segment>;

/// Segments for every generated line
pub type SegmentTable = Vec<SegmentLine>;

impl Segment {
    /// A segment that marks a generated column without an original position
    pub fn generated(generated_column: u32) -> Self {
        Segment {
            generated_column,
            original: None,
        }
    }

    /// A segment pointing at `(line, column)` of source `source_index`
    pub fn mapped(generated_column: u32, source_index: u32, line: u32, column: u32) -> Self {
        Segment {
            generated_column,
            original: Some(OriginalPosition {
                source_index,
                line,
                column,
                name_index: None,
            }),
        }
    }

    /// Attach a name index. Generated-only segments cannot carry a name and
    /// are returned unchanged.
    pub fn with_name(mut self, name_index: u32) -> Self {
        if let Some(original) = self.original.as_mut() {
            original.name_index = Some(name_index);
        }
        self
    }
}

/// Total number of segments in a table
pub fn segment_count(table: &[SegmentLine]) -> usize {
    table.iter().map(Vec::len).sum()
}

/// Check that every token's source and name index resolves in `map`
///
/// # Errors
///
/// Fails with [`CodeGenError::InvalidSourceMap`] on the first dangling index.
pub fn check_references(map: &sourcemap::SourceMap) -> Result<()> {
    for token in map.tokens() {
        if token.has_source() && token.get_source().is_none() {
            return Err(CodeGenError::InvalidSourceMap {
                reason: format!(
                    "source index {} out of range ({} sources)",
                    token.get_src_id(),
                    map.get_source_count()
                ),
            });
        }
        if token.has_name() && token.get_name().is_none() {
            return Err(CodeGenError::InvalidSourceMap {
                reason: format!(
                    "name index {} out of range ({} names)",
                    token.get_name_id(),
                    map.get_name_count()
                ),
            });
        }
    }
    Ok(())
}

/// Decode the tokens of `map` into an owned table
///
/// The table always has at least one line.
///
/// # Errors
///
/// Fails if a token references a source or name `map` does not list.
pub fn segment_table(map: &sourcemap::SourceMap) -> Result<SegmentTable> {
    check_references(map)?;

    let mut table: SegmentTable = vec![Vec::new()];
    for token in map.tokens() {
        let line = token.get_dst_line() as usize;
        if table.len() <= line {
            table.resize_with(line + 1, Vec::new);
        }

        let original = token.has_source().then(|| OriginalPosition {
            source_index: token.get_src_id(),
            line: token.get_src_line(),
            column: token.get_src_col(),
            name_index: token.has_name().then(|| token.get_name_id()),
        });
        table[line].push(Segment {
            generated_column: token.get_dst_col(),
            original,
        });
    }

    Ok(table)
}

/// Build a `sourcemap` map whose tokens are the segments of `table`
///
/// Segment indices resolve against `sources` and `names`, which keep their
/// order in the result.
///
/// # Errors
///
/// Fails if a segment references a source or name outside the given lists,
/// or if the lists contain duplicates.
pub fn build_sourcemap(
    table: &[SegmentLine],
    sources: &[String],
    sources_content: &[Option<String>],
    names: &[String],
) -> Result<sourcemap::SourceMap> {
    let mut builder = sourcemap::SourceMapBuilder::new(None);

    for (index, source) in sources.iter().enumerate() {
        let id = builder.add_source(source);
        if id as usize != index {
            return Err(CodeGenError::InvalidSourceMap {
                reason: format!("duplicate source {source:?}"),
            });
        }
        if let Some(Some(content)) = sources_content.get(index) {
            builder.set_source_contents(id, Some(content.as_str()));
        }
    }
    for (index, name) in names.iter().enumerate() {
        if builder.add_name(name) as usize != index {
            return Err(CodeGenError::InvalidSourceMap {
                reason: format!("duplicate name {name:?}"),
            });
        }
    }

    for (line, segments) in table.iter().enumerate() {
        for segment in segments {
            let line = line as u32;
            match segment.original {
                None => {
                    builder.add(
                        line,
                        segment.generated_column,
                        u32::MAX,
                        u32::MAX,
                        None,
                        None,
                        false,
                    );
                }
                Some(original) => {
                    let source = lookup(sources, original.source_index, "source")?;
                    let name = original
                        .name_index
                        .map(|index| lookup(names, index, "name"))
                        .transpose()?;
                    builder.add(
                        line,
                        segment.generated_column,
                        original.line,
                        original.column,
                        Some(source),
                        name,
                        false,
                    );
                }
            }
        }
    }

    Ok(builder.into_sourcemap())
}

fn lookup<'a>(list: &'a [String], index: u32, what: &str) -> Result<&'a str> {
    list.get(index as usize)
        .map(String::as_str)
        .ok_or_else(|| CodeGenError::InvalidSourceMap {
            reason: format!("{what} index {index} out of range ({} {what}s)", list.len()),
        })
}
