//! Version 3 source map wire format
//!
//! [`SourceMap`] is the JSON shape that options accept and
//! [`CodeGenerator::generate_map`](crate::CodeGenerator::generate_map)
//! returns. Decoding, lookups and serialization of `mappings` go through the
//! `sourcemap` crate.

use crate::error::{CodeGenError, Result};
use crate::segment::{SegmentLine, SegmentTable, build_sourcemap, segment_table};
use serde::{Deserialize, Serialize};

/// A version 3 source map, as read from or written to JSON
///
/// `sources` and `sources_content` are aligned by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default)]
    pub sources_content: Vec<Option<String>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub const VERSION: u32 = 3;

    /// An empty map with no sources and no mappings
    pub fn new() -> Self {
        SourceMap {
            version: Self::VERSION,
            file: None,
            source_root: None,
            sources: Vec::new(),
            sources_content: Vec::new(),
            names: Vec::new(),
            mappings: String::new(),
        }
    }

    /// Build a map from a segment table whose indices resolve against
    /// `sources` and `names`
    ///
    /// # Errors
    ///
    /// Fails if a segment references a source or name that is not listed.
    pub fn from_table(
        table: &[SegmentLine],
        sources: &[String],
        sources_content: &[Option<String>],
        names: &[String],
    ) -> Result<Self> {
        Self::from_sourcemap(&build_sourcemap(table, sources, sources_content, names)?)
    }

    /// Parse a source map from JSON
    ///
    /// # Errors
    ///
    /// Fails if `json` is not a valid source map object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the map to JSON
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Convert a `sourcemap` map into the wire shape
    ///
    /// `sources_content` always comes back aligned with `sources`.
    ///
    /// # Errors
    ///
    /// Fails if the map cannot be written out.
    pub fn from_sourcemap(map: &sourcemap::SourceMap) -> Result<Self> {
        let mut buf = Vec::new();
        map.to_writer(&mut buf)?;
        let mut wire: SourceMap = serde_json::from_slice(&buf)?;
        wire.sources_content.resize(wire.sources.len(), None);
        Ok(wire)
    }

    /// Parse this map with the `sourcemap` crate
    ///
    /// `sourceRoot` is left out, so token sources are exactly the entries of
    /// `sources`.
    ///
    /// # Errors
    ///
    /// Fails if `mappings` is malformed or references a source or name the
    /// map does not list.
    pub fn to_sourcemap(&self) -> Result<sourcemap::SourceMap> {
        let mut normalized = self.clone();
        normalized.source_root = None;
        normalized.sources_content.resize(self.sources.len(), None);
        let json = serde_json::to_vec(&normalized)?;
        Ok(sourcemap::SourceMap::from_slice(&json)?)
    }

    /// Decode `mappings` into a freshly owned segment table
    ///
    /// # Errors
    ///
    /// Fails if `mappings` is malformed or has dangling indices.
    pub fn decoded_mappings(&self) -> Result<SegmentTable> {
        segment_table(&self.to_sourcemap()?)
    }

    /// Source identifier at `index`
    ///
    /// # Errors
    ///
    /// Fails if the map has no source at `index`.
    pub fn source_at(&self, index: u32) -> Result<&str> {
        self.sources
            .get(index as usize)
            .map(String::as_str)
            .ok_or_else(|| CodeGenError::InvalidSourceMap {
                reason: format!(
                    "source index {index} out of range ({} sources)",
                    self.sources.len()
                ),
            })
    }

    /// Name at `index`
    ///
    /// # Errors
    ///
    /// Fails if the map has no name at `index`.
    pub fn name_at(&self, index: u32) -> Result<&str> {
        self.names
            .get(index as usize)
            .map(String::as_str)
            .ok_or_else(|| CodeGenError::InvalidSourceMap {
                reason: format!(
                    "name index {index} out of range ({} names)",
                    self.names.len()
                ),
            })
    }

    /// Embedded content for the source at `index`, if any
    pub fn source_content(&self, index: usize) -> Option<&str> {
        self.sources_content.get(index)?.as_deref()
    }
}

impl Default for SourceMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_json() {
        let map = SourceMap::from_json(r#"{"version":3,"sources":["a.js"],"mappings":"AAAA"}"#)
            .unwrap();
        assert_eq!(map.version, 3);
        assert_eq!(map.sources, vec!["a.js"]);
        assert!(map.sources_content.is_empty());
        assert!(map.names.is_empty());
        assert_eq!(map.file, None);
        assert_eq!(
            map.decoded_mappings().unwrap(),
            vec![vec![Segment::mapped(0, 0, 0, 0)]]
        );
    }

    #[test]
    fn test_json_field_names() {
        let mut map = SourceMap::new();
        map.sources.push("a.js".to_string());
        map.sources_content.push(None);
        map.source_root = Some("src/".to_string());

        let json = map.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"version":3,"sourceRoot":"src/","sources":["a.js"],"sourcesContent":[null],"names":[],"mappings":""}"#
        );
        assert_eq!(SourceMap::from_json(&json).unwrap(), map);
    }

    #[test]
    fn test_from_table_encodes_mappings() {
        let table = vec![
            vec![],
            vec![Segment::mapped(0, 0, 0, 1).with_name(0)],
            vec![Segment::mapped(0, 0, 0, 2)],
        ];
        let map = SourceMap::from_table(
            &table,
            &["a.js".to_string()],
            &[Some("abc".to_string())],
            &["b".to_string()],
        )
        .unwrap();

        assert_eq!(map.mappings, ";AAACA;AAAC");
        assert_eq!(map.sources, vec!["a.js"]);
        assert_eq!(map.sources_content, vec![Some("abc".to_string())]);
        assert_eq!(map.names, vec!["b"]);
        assert_eq!(map.decoded_mappings().unwrap(), table);
    }

    #[test]
    fn test_malformed_mappings_are_rejected() {
        let map = SourceMap {
            sources: vec!["a.js".to_string()],
            mappings: "AA;A*".to_string(),
            ..SourceMap::new()
        };
        assert!(matches!(
            map.decoded_mappings(),
            Err(CodeGenError::Decode(_))
        ));
    }

    #[test]
    fn test_dangling_name_is_rejected() {
        // name index 0 with an empty `names` list
        let map = SourceMap {
            sources: vec!["a.js".to_string()],
            mappings: "AAAAA".to_string(),
            ..SourceMap::new()
        };
        assert!(map.decoded_mappings().is_err());
    }

    #[test]
    fn test_source_root_does_not_prefix_tokens() {
        let map = SourceMap {
            source_root: Some("/src/".to_string()),
            sources: vec!["a.js".to_string()],
            mappings: "AAAA".to_string(),
            ..SourceMap::new()
        };
        let parsed = map.to_sourcemap().unwrap();
        assert_eq!(parsed.tokens().next().unwrap().get_source(), Some("a.js"));
    }

    #[test]
    fn test_lookups() {
        let map = SourceMap {
            sources: vec!["a.js".to_string()],
            sources_content: vec![Some("abc".to_string())],
            names: vec!["x".to_string()],
            ..SourceMap::new()
        };

        assert_eq!(map.source_at(0).unwrap(), "a.js");
        assert_eq!(map.name_at(0).unwrap(), "x");
        assert_eq!(map.source_content(0), Some("abc"));
        assert_eq!(map.source_content(1), None);
        assert!(matches!(
            map.source_at(1),
            Err(CodeGenError::InvalidSourceMap { .. })
        ));
        assert!(map.name_at(4).is_err());
    }
}
