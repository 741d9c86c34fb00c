//! Incremental code builder with a cumulative source map

use crate::accumulator::MappingAccumulator;
use crate::compose::compose;
use crate::error::{CodeGenError, Result};
use crate::line_index::LineIndex;
use crate::options::CodeGeneratorOptions;
use crate::segment::{check_references, segment_count, segment_table};
use crate::shift::shift_fragment;
use crate::source_map::SourceMap;
use crate::types::{Location, Offset};
use std::fmt;

/// Source and name attached to a single point mapping
///
/// The source defaults to the generator's own filename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingTarget<'a> {
    pub source: Option<&'a str>,
    pub name: Option<&'a str>,
}

impl<'a> MappingTarget<'a> {
    pub fn named(name: &'a str) -> Self {
        MappingTarget {
            source: None,
            name: Some(name),
        }
    }

    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }
}

/// A fragment segment resolved against the fragment's own tables
enum Replay<'a> {
    Generated(Location),
    Mapped {
        generated: Location,
        original: Location,
        source_index: usize,
        source: &'a str,
        name: Option<&'a str>,
    },
}

/// An input source map, kept both as given and parsed for lookups
#[derive(Debug, Clone)]
struct InputMap {
    wire: SourceMap,
    parsed: sourcemap::SourceMap,
}

/// Builds generated code piece by piece together with its source map
///
/// Text only ever grows at the end. Offsets given as positions count UTF-16
/// code units and always resolve against the original source text, never
/// against the output.
///
/// Fallible appends check everything before mutating: when one returns an
/// error, neither the output nor the map has changed.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    code: String,
    generated_lines: LineIndex,
    filename: String,
    source: String,
    original_lines: LineIndex,
    map: MappingAccumulator,
    input_source_map: Option<InputMap>,
    file: Option<String>,
    source_root: Option<String>,
}

impl CodeGenerator {
    /// Create a generator from validated options
    ///
    /// # Errors
    ///
    /// Fails with [`CodeGenError::MissingOption`] if `filename` or
    /// `source_content` is missing. With source maps enabled, an input
    /// source map with malformed mappings fails with [`CodeGenError::Decode`]
    /// and one whose mappings reference sources or names it does not list
    /// fails with [`CodeGenError::InvalidSourceMap`].
    pub fn new(options: CodeGeneratorOptions) -> Result<Self> {
        let CodeGeneratorOptions {
            filename,
            source_content,
            source_map,
            input_source_map,
            file,
            source_root,
        } = options;

        let filename = filename.ok_or(CodeGenError::MissingOption { option: "filename" })?;
        let source = source_content.ok_or(CodeGenError::MissingOption {
            option: "sourceContent",
        })?;

        // A disabled generator never reads the input map
        let input_source_map = match input_source_map {
            Some(wire) if source_map => {
                let parsed = wire.to_sourcemap()?;
                check_references(&parsed)?;
                Some(InputMap { wire, parsed })
            }
            _ => None,
        };

        let mut map = MappingAccumulator::new(source_map);
        map.set_source_content(&filename, &source);

        tracing::debug!(
            filename = %filename,
            source_map,
            input_source_map = input_source_map.is_some(),
            "Created code generator"
        );

        Ok(CodeGenerator {
            code: String::new(),
            generated_lines: LineIndex::new(""),
            original_lines: LineIndex::new(&source),
            filename,
            source,
            map,
            input_source_map,
            file,
            source_root,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_map_enabled(&self) -> bool {
        self.map.is_enabled()
    }

    /// Append text without recording any mapping
    pub fn add(&mut self, code: &str) -> &mut Self {
        self.code.push_str(code);
        self.generated_lines.push_str(code);
        self
    }

    /// Append text that comes with its own source map
    ///
    /// `map` describes `code` on its own: its generated coordinates start at
    /// the beginning of `code`, and its original coordinates are relative to
    /// `position` in the original source (the start of the source when
    /// omitted). Its mappings are moved into output coordinates and recorded
    /// with the sources and names of `map`. Content embedded in `map` is kept
    /// for sources the generator has no content for yet.
    ///
    /// With source maps disabled `map` is ignored and `code` is appended.
    ///
    /// # Errors
    ///
    /// Fails if `position` does not exist in the original source, if `map`
    /// has malformed mappings, if its segments reference sources or names
    /// it does not list, or if shifting a coordinate overflows. Nothing is
    /// appended in that case.
    pub fn add_with_map(
        &mut self,
        code: &str,
        map: &SourceMap,
        position: Option<Offset>,
    ) -> Result<&mut Self> {
        if !self.map.is_enabled() {
            tracing::trace!("Source maps disabled, appending fragment without mappings");
            return Ok(self.add(code));
        }

        let original = match position {
            Some(position) => self.resolve(position, true)?,
            None => Location::default(),
        };
        let insertion = self.current_location();
        let table = segment_table(&map.to_sourcemap()?)?;
        let table = shift_fragment(table, insertion, original)?;

        let mut pending = Vec::with_capacity(segment_count(&table));
        for (line, segments) in table.iter().enumerate() {
            for segment in segments {
                let generated = Location::new(line as u32, segment.generated_column);
                let replay = match segment.original {
                    None => Replay::Generated(generated),
                    Some(origin) => Replay::Mapped {
                        generated,
                        original: Location::new(origin.line, origin.column),
                        source_index: origin.source_index as usize,
                        source: map.source_at(origin.source_index)?,
                        name: origin
                            .name_index
                            .map(|index| map.name_at(index))
                            .transpose()?,
                    },
                };
                pending.push(replay);
            }
        }

        for replay in &pending {
            match *replay {
                Replay::Generated(generated) => self.map.add_generated(generated),
                Replay::Mapped {
                    generated,
                    original,
                    source_index,
                    source,
                    name,
                } => {
                    if let Some(content) = map.source_content(source_index) {
                        self.map.set_source_content(source, content);
                    }
                    self.map.add_mapping(generated, original, source, name);
                }
            }
        }

        tracing::debug!(
            segments = pending.len(),
            line = insertion.line,
            column = insertion.column,
            "Replayed fragment map"
        );

        Ok(self.add(code))
    }

    /// Append text whose start maps to a single original position
    ///
    /// Records one mapping from the current end of the output to `position`.
    /// Without a position nothing is recorded and `code` is appended as is.
    ///
    /// # Errors
    ///
    /// Fails if `position` does not exist in the original source. Locations
    /// are only checked when the mapping targets the generator's own source.
    /// Nothing is appended in that case.
    pub fn add_with_mapping(
        &mut self,
        code: &str,
        position: Option<Offset>,
        target: MappingTarget<'_>,
    ) -> Result<&mut Self> {
        let Some(position) = position else {
            return Ok(self.add(code));
        };
        if !self.map.is_enabled() {
            return Ok(self.add(code));
        }

        let source = target.source.unwrap_or(self.filename.as_str());
        let original = self.resolve(position, source == self.filename)?;
        let generated = self.current_location();

        tracing::trace!(
            line = generated.line,
            column = generated.column,
            source,
            "Recording point mapping"
        );
        self.map.add_mapping(generated, original, source, target.name);

        Ok(self.add(code))
    }

    /// Location of the end of the output
    pub fn current_location(&self) -> Location {
        self.generated_lines.end_location(&self.code)
    }

    /// Leading whitespace of the last output line
    pub fn current_indent(&self) -> &str {
        let end = self.current_location();
        let start = self
            .generated_lines
            .byte_offset(&self.code, Location::new(end.line, 0))
            .unwrap_or(0);

        let line = &self.code[start..];
        let indent = line
            .find(|ch: char| !ch.is_whitespace())
            .unwrap_or(line.len());
        &line[..indent]
    }

    /// Build the source map for everything appended so far
    ///
    /// Returns None when source maps are disabled. With an input source map
    /// the result is composed with it, so positions trace back to the
    /// sources the input map describes.
    ///
    /// # Errors
    ///
    /// Fails if the map cannot be written out or composition with the
    /// input map fails.
    pub fn generate_map(&self) -> Result<Option<SourceMap>> {
        if !self.map.is_enabled() {
            return Ok(None);
        }

        let Some(input) = &self.input_source_map else {
            return self
                .map
                .to_source_map(self.file.clone(), self.source_root.clone())
                .map(Some);
        };

        let mut composed = compose(&input.parsed, &self.map.to_sourcemap(), &self.filename)?;
        composed.file = self.file.clone().or_else(|| input.wire.file.clone());
        composed.source_root = input
            .wire
            .source_root
            .clone()
            .or_else(|| self.source_root.clone());
        Ok(Some(composed))
    }

    /// The output so far
    pub fn as_str(&self) -> &str {
        &self.code
    }

    pub fn into_string(self) -> String {
        self.code
    }

    /// Resolve a position against the original source
    fn resolve(&self, position: Offset, check_location: bool) -> Result<Location> {
        match position {
            Offset::Index(offset) => self
                .original_lines
                .location_for_index(&self.source, offset)
                .ok_or(CodeGenError::OffsetOutOfBounds {
                    offset,
                    length: self.original_lines.utf16_length(),
                }),
            Offset::Location(location) => {
                if check_location
                    && self
                        .original_lines
                        .index_for_location(&self.source, location)
                        .is_none()
                {
                    return Err(CodeGenError::LocationOutOfBounds {
                        line: location.line,
                        column: location.column,
                    });
                }
                Ok(location)
            }
        }
    }
}

impl fmt::Display for CodeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    fn generator(source: &str) -> CodeGenerator {
        CodeGenerator::new(CodeGeneratorOptions::new("test.js", source)).unwrap()
    }

    #[test]
    fn test_missing_options() {
        let err = CodeGenerator::new(CodeGeneratorOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CodeGenError::MissingOption { option: "filename" }
        ));

        let options = CodeGeneratorOptions {
            filename: Some("test.js".to_string()),
            ..CodeGeneratorOptions::default()
        };
        let err = CodeGenerator::new(options).unwrap_err();
        assert_eq!(err.to_string(), "options.sourceContent is required");
    }

    #[test]
    fn test_malformed_input_map_rejected_at_construction() {
        let input = SourceMap {
            mappings: "A!".to_string(),
            ..SourceMap::new()
        };
        let options = CodeGeneratorOptions::new("test.js", "abc").with_input_source_map(input);
        assert!(matches!(
            CodeGenerator::new(options),
            Err(CodeGenError::Decode(_))
        ));
    }

    #[test]
    fn test_dangling_indices_in_input_map_rejected_at_construction() {
        // Decodes fine, but source index 1 does not exist
        let input = SourceMap {
            sources: vec!["original.ts".to_string()],
            mappings: "AAAA,ECAA".to_string(),
            ..SourceMap::new()
        };
        let options = CodeGeneratorOptions::new("test.js", "abc").with_input_source_map(input);
        assert!(CodeGenerator::new(options).is_err());

        // Name index 0 with no names
        let input = SourceMap {
            sources: vec!["original.ts".to_string()],
            mappings: "AAAAA".to_string(),
            ..SourceMap::new()
        };
        let options = CodeGeneratorOptions::new("test.js", "abc").with_input_source_map(input);
        assert!(CodeGenerator::new(options).is_err());
    }

    #[test]
    fn test_input_map_ignored_when_source_maps_disabled() {
        let input = SourceMap {
            mappings: "A!".to_string(),
            ..SourceMap::new()
        };
        let options = CodeGeneratorOptions::new("test.js", "abc")
            .with_source_map(false)
            .with_input_source_map(input);
        let code = CodeGenerator::new(options).unwrap();
        assert!(code.generate_map().unwrap().is_none());
    }

    #[test]
    fn test_current_location_tracks_appends() {
        let mut code = generator("abc");
        assert_eq!(code.current_location(), Location::new(0, 0));
        code.add("ab");
        assert_eq!(code.current_location(), Location::new(0, 2));
        code.add("\nxyz\n");
        assert_eq!(code.current_location(), Location::new(2, 0));
    }

    #[test]
    fn test_resolve_offsets_against_original_source() {
        let code = generator("ab\ncd");
        assert_eq!(code.resolve(Offset::Index(4), true).unwrap(), Location::new(1, 1));
        assert!(matches!(
            code.resolve(Offset::Index(6), true),
            Err(CodeGenError::OffsetOutOfBounds {
                offset: 6,
                length: 5
            })
        ));
        assert!(matches!(
            code.resolve(Location::new(2, 0).into(), true),
            Err(CodeGenError::LocationOutOfBounds { line: 2, column: 0 })
        ));
        // Unchecked locations pass through
        assert_eq!(
            code.resolve(Location::new(9, 9).into(), false).unwrap(),
            Location::new(9, 9)
        );
    }

    #[test]
    fn test_index_counts_utf16_units() {
        // 'é' is one UTF-16 unit but two bytes
        let code = generator("é=1");
        assert_eq!(code.resolve(Offset::Index(1), true).unwrap(), Location::new(0, 1));
        assert_eq!(code.resolve(Offset::Index(3), true).unwrap(), Location::new(0, 3));
        assert!(matches!(
            code.resolve(Offset::Index(4), true),
            Err(CodeGenError::OffsetOutOfBounds {
                offset: 4,
                length: 3
            })
        ));

        let code = generator("😀x");
        assert_eq!(code.resolve(Offset::Index(2), true).unwrap(), Location::new(0, 2));
        assert!(code.resolve(Offset::Index(1), true).is_err());
    }

    #[test]
    fn test_add_with_mapping_to_other_source() {
        let mut code = generator("abc");
        code.add_with_mapping(
            "x",
            Some(Location::new(7, 3).into()),
            MappingTarget::named("x").with_source("other.js"),
        )
        .unwrap();

        let map = code.generate_map().unwrap().unwrap();
        assert_eq!(map.sources, vec!["other.js"]);
        assert_eq!(map.sources_content, vec![None]);
        assert_eq!(map.names, vec!["x"]);
        assert_eq!(
            map.decoded_mappings().unwrap(),
            vec![vec![Segment::mapped(0, 0, 7, 3).with_name(0)]]
        );
    }

    #[test]
    fn test_add_with_mapping_without_position_records_nothing() {
        let mut code = generator("abc");
        code.add_with_mapping("x", None, MappingTarget::named("x")).unwrap();

        assert_eq!(code.as_str(), "x");
        let map = code.generate_map().unwrap().unwrap();
        assert!(map.sources.is_empty());
        assert!(map.names.is_empty());
        assert_eq!(map.mappings, "");
    }

    #[test]
    fn test_display_and_into_string() {
        let mut code = generator("abc");
        code.add("a").add("\nb");
        assert_eq!(code.to_string(), "a\nb");
        assert_eq!(code.into_string(), "a\nb");
    }
}
