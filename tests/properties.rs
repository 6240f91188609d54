//! Property-based tests using proptest

use jrp_markup::{
    kana::{kana_equal, split_moras, to_hiragana, to_katakana, Script},
    markup::{
        accent::{Accent, AccentPart},
        compact_parser::parse_compact,
        tagged_parser::parse_tagged,
        unit::Unit,
    },
};
use proptest::prelude::*;

const KANA: &str = "あいうえおきしちにひみりゃゅょぁぃぅぇぉっんゎーふてでくぐゔアイウエオキシチニヒミリャュョァィゥェォッンヮフテデクグヴ";

fn kana_string() -> impl Strategy<Value = String> {
    let chars: Vec<char> = KANA.chars().collect();
    prop::collection::vec(prop::sample::select(chars), 0..16)
        .prop_map(|chars| chars.into_iter().collect())
}

fn check_units(units: &[Unit]) -> Result<(), TestCaseError> {
    for unit in units {
        prop_assert!(!unit.segments.is_empty());
        for segment in &unit.segments {
            if let Some(reading) = segment.reading() {
                prop_assert!(!reading.is_empty());
                prop_assert!(!kana_equal(segment.text(), &[reading]));
            }
        }
        if unit.was_bare {
            prop_assert!(unit.accents.is_empty());
        }
    }
    Ok(())
}

proptest! {
    /// Every character ends up in exactly one mora
    #[test]
    fn test_moras_cover_reading(reading in "\\PC{0,20}") {
        let moras = split_moras(&reading, Script::Katakana);
        let total: usize = moras.iter().map(|m| m.chars().count()).sum();
        prop_assert_eq!(total, to_katakana(&reading).chars().count());
    }

    #[test]
    fn test_moras_cover_kana(reading in kana_string()) {
        let moras = split_moras(&reading, Script::Hiragana);
        prop_assert_eq!(moras.concat(), to_hiragana(&reading));
    }

    #[test]
    fn test_hiragana_round_trip(s in kana_string()) {
        prop_assert_eq!(to_hiragana(&to_katakana(&s)), to_hiragana(&s));
    }

    #[test]
    fn test_kana_equal_reflexive(s in kana_string()) {
        prop_assert!(kana_equal(&s, &[&s]));
        prop_assert!(kana_equal(&to_hiragana(&s), &[&to_katakana(&s)]));
    }

    /// The last span of a compound accent takes the remaining moras
    #[test]
    fn test_compound_last_span(spans in prop::collection::vec(1usize..5, 1..4), rest in 0usize..5) {
        let sum: usize = spans.iter().sum();
        let token = spans
            .iter()
            .map(|span| format!("0@{}", span))
            .chain(["0".to_owned()])
            .collect::<Vec<_>>()
            .join("-");

        let accent = Accent::from_str(&token, Some(sum + rest)).unwrap();
        let Accent::Compound(parts) = accent else {
            panic!("not a compound accent: {}", token);
        };
        prop_assert_eq!(parts.len(), spans.len() + 1);
        prop_assert_eq!(parts.last(), Some(&AccentPart { downstep: 0, moras: rest }));
    }

    #[test]
    fn test_compound_longer_than_reading(spans in prop::collection::vec(1usize..5, 1..4), short in 1usize..5) {
        let sum: usize = spans.iter().sum();
        let token = spans
            .iter()
            .map(|span| format!("0@{}", span))
            .chain(["0".to_owned()])
            .collect::<Vec<_>>()
            .join("-");

        prop_assert!(Accent::from_str(&token, Some(sum.saturating_sub(short))).is_err());
    }

    /// Arbitrary markup never panics, and whatever parses is well formed
    #[test]
    fn test_compact_parser_is_total(line in r"[{}\[\]|=;,!Y@?0-9 たべる食東京かなカナ<>ahknox\\-]{0,30}") {
        if let Ok(units) = parse_compact(&line) {
            check_units(&units)?;
        }
    }

    #[test]
    fn test_tagged_parser_is_total(line in r"[{}\[\]|=;,!Y@?0-9 たべる食東京かなカナ<>ahknox\\-]{0,30}") {
        if let Ok(units) = parse_tagged(&line) {
            check_units(&units)?;
        }
    }
}
