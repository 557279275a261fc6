use proptest::prelude::*;
use varitoken_tree::path::TokenPath;
use varitoken_tree::value::{normalize_hex_color, parse_value, types, ParsedValue};
use varitoken_tree::{convert_csv, ConvertConfig};

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9][A-Za-z0-9 _-]{0,8}").unwrap()
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("/"),
        Just("."),
        Just(" / "),
        Just("//"),
        Just("./"),
        Just(" . "),
    ]
}

/// Segments joined with a random mix of separators and padding.
fn mixed_join() -> impl Strategy<Value = (Vec<String>, String)> {
    proptest::collection::vec((segment(), separator()), 1..6).prop_map(|parts| {
        let segments: Vec<String> = parts.iter().map(|(s, _)| s.clone()).collect();
        let mut joined = String::from("  ");
        for (i, (seg, sep)) in parts.iter().enumerate() {
            if i > 0 {
                joined.push_str(sep);
            }
            joined.push_str(seg);
        }
        joined.push(' ');
        (segments, joined)
    })
}

fn hex_digits() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::string::string_regex("[0-9a-fA-F]{6}").unwrap(),
        proptest::string::string_regex("[0-9a-fA-F]{8}").unwrap(),
    ]
}

fn csv_row() -> impl Strategy<Value = String> {
    let mode = prop_oneof![Just("Light"), Just("Dark"), Just("Mode 1")];
    let name = proptest::string::string_regex("[a-z]{1,4}(/[a-z]{1,4}){0,2}").unwrap();
    let kind = prop_oneof![Just("color"), Just("number"), Just("string"), Just("")];
    let value = prop_oneof![
        proptest::string::string_regex("[0-9a-f]{8}").unwrap(),
        proptest::string::string_regex("[0-9]{1,3}").unwrap(),
        proptest::string::string_regex("[a-z]{1,5}").unwrap(),
        (1u8..6).prop_map(|n| format!("type:VARIABLE_ALIAS id:VariableID:{n}:1")),
    ];
    let id = prop_oneof![Just(String::new()), (1u8..6).prop_map(|n| format!("{n}:1"))];
    (mode, name, kind, value, id)
        .prop_map(|(mode, name, kind, value, id)| format!("{mode},{name},{kind},{value},{id}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn mixed_separators_match_slash_only_form((segments, joined) in mixed_join()) {
        let mixed = TokenPath::from_group_and_name(None, &joined, false);
        let slash_only = TokenPath::from_group_and_name(None, &segments.join("/"), false);
        prop_assert_eq!(&mixed, &slash_only);
        prop_assert_eq!(mixed, TokenPath::new(segments));
    }

    #[test]
    fn group_and_name_split_point_does_not_matter(
        (segments, _) in mixed_join(),
        split in 0usize..6,
    ) {
        let split = split.min(segments.len() - 1);
        let (group, name) = segments.split_at(split);
        let path = TokenPath::from_group_and_name(Some(&group.join(".")), &name.join("/"), false);
        prop_assert_eq!(path, TokenPath::new(segments));
    }

    #[test]
    fn color_normalization_ignores_hash_prefix(hex in hex_digits()) {
        let bare = normalize_hex_color(&hex);
        let prefixed = normalize_hex_color(&format!("#{hex}"));
        prop_assert_eq!(&bare, &prefixed);

        let normalized = bare.unwrap();
        prop_assert_eq!(normalized.clone(), format!("#{}", hex.to_ascii_lowercase()));
        prop_assert_eq!(normalize_hex_color(&normalized), Some(normalized));
    }

    #[test]
    fn non_numeric_numbers_keep_their_text(raw in "[a-zA-Z][a-zA-Z ]{0,10}[a-zA-Z]") {
        prop_assert_eq!(parse_value(&raw, types::NUMBER), ParsedValue::NotANumber(raw.clone()));
    }

    #[test]
    fn conversion_is_deterministic(rows in proptest::collection::vec(csv_row(), 1..24)) {
        let text = format!("Mode,Name,Type,Value,ID\n{}\n", rows.join("\n"));
        let config = ConvertConfig::default();

        let first = convert_csv(&text, &config).unwrap();
        let second = convert_csv(&text, &config).unwrap();
        prop_assert_eq!(first.documents, second.documents);
        prop_assert_eq!(first.token_set.report, second.token_set.report);
    }
}
