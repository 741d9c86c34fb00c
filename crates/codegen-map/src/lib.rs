//! Incremental code generation with source maps
//!
//! This crate builds generated text piece by piece while keeping a source
//! map from the output back to the original sources. Pieces can be plain
//! text, text with a single original position, or text that already comes
//! with its own fragment source map, which is moved into output
//! coordinates before it is merged in.
//!
//! # Overview
//!
//! The core types are:
//! - [`CodeGenerator`]: Owns the output and accumulates its source map
//! - [`SourceMap`]: Version 3 source map in its JSON wire format
//! - [`LineIndex`]: Offset <-> line/column lookups over a text
//! - [`MappingAccumulator`]: Collects point mappings and serializes them
//!
//! Mapping strings are decoded and encoded with the `sourcemap` crate;
//! fragment maps are decoded into an owned [`SegmentTable`] so they can be
//! shifted before they are merged.
//!
//! # Example
//!
//! ```rust
//! use codegen_map::*;
//!
//! let mut code = CodeGenerator::new(CodeGeneratorOptions::new("input.js", "let a = 1;")).unwrap();
//! code.add("// generated\n");
//! code.add_with_mapping("var a", Some(Offset::Index(4)), MappingTarget::named("a"))
//!     .unwrap();
//! code.add(" = 1;");
//!
//! assert_eq!(code.to_string(), "// generated\nvar a = 1;");
//! let map = code.generate_map().unwrap().unwrap();
//! assert_eq!(map.sources, vec!["input.js"]);
//! assert_eq!(map.mappings, ";AAAIA");
//! ```

pub mod accumulator;
pub mod compose;
pub mod error;
pub mod generator;
pub mod line_index;
pub mod options;
pub mod segment;
pub mod shift;
pub mod source_map;
pub mod types;

// Re-export main types
pub use accumulator::MappingAccumulator;
pub use compose::compose;
pub use error::{CodeGenError, Result};
pub use generator::{CodeGenerator, MappingTarget};
pub use line_index::LineIndex;
pub use options::CodeGeneratorOptions;
pub use segment::{OriginalPosition, Segment, SegmentLine, SegmentTable};
pub use shift::{shift_fragment, shift_generated, shift_mappings, shift_original};
pub use source_map::SourceMap;
pub use types::{Location, Offset};
