//! Construction options for [`CodeGenerator`](crate::CodeGenerator)

use crate::source_map::SourceMap;
use serde::{Deserialize, Serialize};

/// Options accepted by [`CodeGenerator::new`](crate::CodeGenerator::new)
///
/// Deserializes from the camelCase JSON form
/// `{"filename", "sourceContent", "sourceMap", "inputSourceMap", "file", "sourceRoot"}`;
/// absent keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeGeneratorOptions {
    /// Identifier of the original source; required. Used as the default
    /// source of point mappings.
    pub filename: Option<String>,
    /// Text of the original source; required. Offsets resolve against it and
    /// it is embedded as the content of `filename`.
    pub source_content: Option<String>,
    /// Whether to record mappings at all (default `true`)
    pub source_map: bool,
    /// Map describing where `source_content` itself came from (default none)
    pub input_source_map: Option<SourceMap>,
    /// `file` of the generated map (default none)
    pub file: Option<String>,
    /// `sourceRoot` of the generated map (default none)
    pub source_root: Option<String>,
}

impl CodeGeneratorOptions {
    /// Options with both required fields set and every other field defaulted
    pub fn new(filename: impl Into<String>, source_content: impl Into<String>) -> Self {
        CodeGeneratorOptions {
            filename: Some(filename.into()),
            source_content: Some(source_content.into()),
            ..Self::default()
        }
    }

    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    pub fn with_input_source_map(mut self, map: SourceMap) -> Self {
        self.input_source_map = Some(map);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_source_root(mut self, source_root: impl Into<String>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }
}

impl Default for CodeGeneratorOptions {
    fn default() -> Self {
        CodeGeneratorOptions {
            filename: None,
            source_content: None,
            source_map: true,
            input_source_map: None,
            file: None,
            source_root: None,
        }
    }
}
