use proptest::prelude::*;
use serde_json::Value;
use wirefuzz::json::embedded::{re_encode_embedded_json, try_decode_embedded_json};
use wirefuzz::json::ValueTree;

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::from(n)),
        "[a-zA-Z0-9 _.-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6).prop_map(|entries| {
                Value::Object(entries.into_iter().collect())
            }),
        ]
    })
}

proptest! {
    #[test]
    fn decompose_recompose_round_trip(value in json_value()) {
        let tree = ValueTree::decompose(&value);
        prop_assert_eq!(tree.recompose(), value);
    }

    #[test]
    fn canonical_text_parses_back_to_the_same_tree(value in json_value()) {
        let tree = ValueTree::decompose(&value);
        let reparsed = ValueTree::parse(&tree.to_canonical_string()).unwrap();
        prop_assert_eq!(reparsed.recompose(), tree.recompose());
    }

    #[test]
    fn embedded_encode_decode_law(value in json_value()) {
        let tree = ValueTree::decompose(&value);
        let decoded = try_decode_embedded_json(&re_encode_embedded_json(&tree)).unwrap();
        prop_assert_eq!(decoded.recompose(), tree.recompose());
    }

    #[test]
    fn leaf_count_matches_walk(value in json_value()) {
        let tree = ValueTree::decompose(&value);
        prop_assert!(!tree.is_empty());
        for path in &tree.paths {
            prop_assert!(!path.segments.is_empty());
        }
    }

    #[test]
    fn url_round_trip_with_safe_components(
        dirs in prop::collection::vec("[a-zA-Z0-9_.-]{0,8}", 1..5),
        params in prop::collection::vec(("[a-zA-Z0-9_]{1,8}", "[a-zA-Z0-9_.-]{0,8}"), 0..4),
    ) {
        let mut raw = String::new();
        for dir in &dirs {
            raw.push('/');
            raw.push_str(dir);
        }
        if !params.is_empty() {
            raw.push('?');
            let joined: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            raw.push_str(&joined.join("&"));
        }
        let parsed = wirefuzz::http::url::Url::parse(raw.as_bytes());
        prop_assert_eq!(parsed.serialize(), raw.into_bytes());
    }
}
