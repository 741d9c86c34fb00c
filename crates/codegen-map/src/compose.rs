//! Transitive composition of two source maps
//!
//! Given an input map A (earliest source -> builder source) and the
//! builder's map B (builder source -> output), [`compose`] produces a map
//! from the earliest source to the output.

use crate::accumulator::MappingAccumulator;
use crate::error::{CodeGenError, Result};
use crate::source_map::SourceMap;
use crate::types::Location;

/// An input mapping found for a builder position
struct Upstream<'a> {
    location: Location,
    source: &'a str,
    name: Option<&'a str>,
}

/// Closest mapping of `input` on `location.line` at or before
/// `location.column`
///
/// Tokens on earlier lines and tokens without an original position yield
/// None.
fn lookup<'a>(input: &'a sourcemap::SourceMap, location: Location) -> Option<Upstream<'a>> {
    let token = input.lookup_token(location.line, location.column)?;
    if token.get_dst_line() != location.line || !token.has_source() {
        return None;
    }
    Some(Upstream {
        location: Location::new(token.get_src_line(), token.get_src_col()),
        source: token.get_source()?,
        name: token.get_name(),
    })
}

/// Compose `input` (which maps into `own_source`) with `map`
///
/// Mappings of `map` that point into `own_source` and land on a mapped
/// position of `input` are redirected to `input`'s original position; the
/// name of the input mapping wins over the builder mapping's name. All other
/// mappings pass through unchanged.
///
/// The result lists sources referenced by its mappings first, then any of
/// `input`'s sources not referenced. Source content is carried over from
/// whichever map supplied the source. `file` and `sourceRoot` are left for
/// the caller to set.
///
/// # Errors
///
/// Fails if a token of `map` references a source it does not list, or if
/// the result cannot be written out.
pub fn compose(
    input: &sourcemap::SourceMap,
    map: &sourcemap::SourceMap,
    own_source: &str,
) -> Result<SourceMap> {
    let mut composed = MappingAccumulator::new(true);
    let mut substituted = 0usize;

    for token in map.tokens() {
        let generated = Location::new(token.get_dst_line(), token.get_dst_col());
        if !token.has_source() {
            composed.add_generated(generated);
            continue;
        }

        let source = token
            .get_source()
            .ok_or_else(|| CodeGenError::InvalidSourceMap {
                reason: format!("source index {} out of range", token.get_src_id()),
            })?;
        let location = Location::new(token.get_src_line(), token.get_src_col());

        let upstream = if source == own_source {
            lookup(input, location)
        } else {
            None
        };

        match upstream {
            Some(upstream) => {
                composed.add_mapping(
                    generated,
                    upstream.location,
                    upstream.source,
                    upstream.name.or(token.get_name()),
                );
                substituted += 1;
            }
            None => composed.add_mapping(generated, location, source, token.get_name()),
        }
    }

    for source in input.sources() {
        composed.register_source(source);
    }
    carry_contents(&mut composed, input);
    carry_contents(&mut composed, map);

    tracing::debug!(
        mappings = composed.len(),
        substituted,
        "Composed source map with input map"
    );

    composed.to_source_map(None, None)
}

fn carry_contents(composed: &mut MappingAccumulator, map: &sourcemap::SourceMap) {
    for (index, source) in map.sources().enumerate() {
        if let Some(content) = map.get_source_contents(index as u32) {
            composed.set_source_content(source, content);
        }
    }
}
