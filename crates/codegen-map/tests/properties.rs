//! Property tests for output assembly and map serialization

use codegen_map::{CodeGenerator, CodeGeneratorOptions, MappingTarget, Offset, SourceMap};
use proptest::prelude::*;

const SOURCE: &str = "let a = 1;\nlet é = 2;\n";

fn generator() -> CodeGenerator {
    CodeGenerator::new(CodeGeneratorOptions::new("input.js", SOURCE)).unwrap()
}

fn piece() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zé😀 \\t\\n;{}]{0,12}").unwrap()
}

proptest! {
    #[test]
    fn output_is_concatenation_of_added_pieces(pieces in prop::collection::vec(piece(), 0..24)) {
        let mut code = generator();
        for piece in &pieces {
            code.add(piece);
        }

        prop_assert_eq!(code.to_string(), pieces.concat());
        let map = code.generate_map().unwrap().unwrap();
        prop_assert_eq!(map.mappings, "");
    }

    #[test]
    fn mapped_pieces_keep_output_and_round_trip(
        pieces in prop::collection::vec((piece(), 0usize..=22, any::<bool>()), 0..16)
    ) {
        let mut code = generator();
        for (piece, index, named) in &pieces {
            let target = if *named { MappingTarget::named("a") } else { MappingTarget::default() };
            code.add_with_mapping(piece, Some(Offset::Index(*index)), target).unwrap();
        }

        let expected: String = pieces.iter().map(|(piece, _, _)| piece.as_str()).collect();
        prop_assert_eq!(code.as_str(), expected.as_str());

        let map = code.generate_map().unwrap().unwrap();
        let rebuilt = SourceMap::from_table(
            &map.decoded_mappings().unwrap(),
            &map.sources,
            &map.sources_content,
            &map.names,
        )
        .unwrap();
        prop_assert_eq!(rebuilt.mappings, map.mappings);
    }
}
