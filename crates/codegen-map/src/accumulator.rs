//! Point mapping accumulation and serialization

use crate::error::Result;
use crate::segment::{SegmentTable, segment_table};
use crate::source_map::SourceMap;
use crate::types::Location;
use indexmap::IndexSet;
use sourcemap::SourceMapBuilder;
use std::collections::HashMap;

/// One recorded point mapping; sources and names are interned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordedMapping {
    generated: Location,
    original: Option<RecordedOrigin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordedOrigin {
    source: usize,
    location: Location,
    name: Option<usize>,
}

/// Collects point mappings and serializes them into a source map
///
/// Mappings may arrive in any order; they are sorted by generated position
/// when the map is built, keeping insertion order between mappings at the
/// same position. Sources and names are deduplicated and listed in
/// first-seen order. When the accumulator is disabled every recording call
/// is a no-op.
#[derive(Debug, Clone)]
pub struct MappingAccumulator {
    enabled: bool,
    mappings: Vec<RecordedMapping>,
    sources: IndexSet<String>,
    names: IndexSet<String>,
    contents: HashMap<String, String>,
}

impl MappingAccumulator {
    pub fn new(enabled: bool) -> Self {
        MappingAccumulator {
            enabled,
            mappings: Vec::new(),
            sources: IndexSet::new(),
            names: IndexSet::new(),
            contents: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of recorded mappings
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Record a mapping from `generated` to `original` in `source`
    pub fn add_mapping(
        &mut self,
        generated: Location,
        original: Location,
        source: &str,
        name: Option<&str>,
    ) {
        if !self.enabled {
            return;
        }
        let source = self.sources.insert_full(source.to_string()).0;
        let name = name.map(|name| self.names.insert_full(name.to_string()).0);
        self.mappings.push(RecordedMapping {
            generated,
            original: Some(RecordedOrigin {
                source,
                location: original,
                name,
            }),
        });
    }

    /// Record a generated position that maps to no original position
    pub fn add_generated(&mut self, generated: Location) {
        if !self.enabled {
            return;
        }
        self.mappings.push(RecordedMapping {
            generated,
            original: None,
        });
    }

    /// Append `source` to the source list without recording a mapping
    pub fn register_source(&mut self, source: &str) {
        if self.enabled {
            self.sources.insert(source.to_string());
        }
    }

    /// Attach content to `source`. Content that is already set is kept.
    ///
    /// Content only shows up in the map once `source` is listed.
    /// Returns whether the content was stored.
    pub fn set_source_content(&mut self, source: &str, content: &str) -> bool {
        if !self.enabled || self.contents.contains_key(source) {
            return false;
        }
        self.contents.insert(source.to_string(), content.to_string());
        true
    }

    /// Build the recorded mappings into a `sourcemap` map
    pub fn to_sourcemap(&self) -> sourcemap::SourceMap {
        let mut builder = SourceMapBuilder::new(None);

        // Register up front so ids follow first-seen order, not token order
        for source in &self.sources {
            let id = builder.add_source(source);
            if let Some(content) = self.contents.get(source) {
                builder.set_source_contents(id, Some(content.as_str()));
            }
        }
        for name in &self.names {
            builder.add_name(name);
        }

        let mut ordered: Vec<&RecordedMapping> = self.mappings.iter().collect();
        ordered.sort_by_key(|mapping| mapping.generated);

        for mapping in ordered {
            let Location { line, column } = mapping.generated;
            match mapping.original {
                None => {
                    builder.add(line, column, u32::MAX, u32::MAX, None, None, false);
                }
                Some(origin) => {
                    let source = self.sources.get_index(origin.source).map(String::as_str);
                    let name = origin
                        .name
                        .and_then(|index| self.names.get_index(index))
                        .map(String::as_str);
                    builder.add(
                        line,
                        column,
                        origin.location.line,
                        origin.location.column,
                        source,
                        name,
                        false,
                    );
                }
            }
        }

        builder.into_sourcemap()
    }

    /// Segment table of the recorded mappings, in output order
    ///
    /// # Errors
    ///
    /// Fails only if the built map cannot be read back.
    pub fn segment_table(&self) -> Result<SegmentTable> {
        segment_table(&self.to_sourcemap())
    }

    /// Encode the recorded mappings as a `mappings` string
    ///
    /// # Errors
    ///
    /// Fails if the map cannot be written out.
    pub fn serialize(&self) -> Result<String> {
        Ok(self.to_source_map(None, None)?.mappings)
    }

    /// Build the full source map
    ///
    /// # Errors
    ///
    /// Fails if the map cannot be written out.
    pub fn to_source_map(
        &self,
        file: Option<String>,
        source_root: Option<String>,
    ) -> Result<SourceMap> {
        let mut map = SourceMap::from_sourcemap(&self.to_sourcemap())?;
        map.file = file;
        map.source_root = source_root;
        Ok(map)
    }
}
