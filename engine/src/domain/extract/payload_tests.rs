//! Tests for the payload parser

use super::*;

fn parsed(text: &str) -> ValueTree {
    parse_str(text).unwrap()
}

fn string_at(tree: &ValueTree, key: &str) -> String {
    tree.get(key).and_then(ValueTree::as_str).unwrap().to_string()
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn test_parse_simple_object() {
    let tree = parsed(r#"{"name":"claude","count":42,"enabled":true,"nothing":null}"#);
    assert_eq!(string_at(&tree, "name"), "claude");
    assert_eq!(
        tree.get("count"),
        Some(&ValueTree::Number(Number::Integer(42)))
    );
    assert_eq!(tree.get("enabled"), Some(&ValueTree::Bool(true)));
    assert!(tree.get("nothing").unwrap().is_null());
}

#[test]
fn test_parse_nested_object() {
    let tree = parsed(r#"{"outer": {"inner": {"value": "deep"}}}"#);
    assert_eq!(
        tree.pointer("/outer/inner/value").and_then(ValueTree::as_str),
        Some("deep")
    );
}

#[test]
fn test_parse_empty_containers() {
    assert_eq!(parsed("{}"), ValueTree::Object(HashMap::new()));
    assert_eq!(parsed(" [ ] "), ValueTree::Array(Vec::new()));
}

#[test]
fn test_parse_array_of_objects() {
    let tree = parsed(r#"{"results":[{"tokenCount":7},{"tokenCount":9}]}"#);
    assert_eq!(
        tree.pointer("/results/1/tokenCount"),
        Some(&ValueTree::Number(Number::Integer(9)))
    );
}

#[test]
fn test_duplicate_keys_last_wins() {
    let tree = parsed(r#"{"a":1,"a":2}"#);
    assert_eq!(tree.get("a"), Some(&ValueTree::Number(Number::Integer(2))));
}

// ============================================================================
// STRINGS
// ============================================================================

#[test]
fn test_escapes_match_reference_parser() {
    let doc = r#"{"escaped":"a\"b\n c \u0041"}"#;
    let tree = parsed(doc);
    let reference: serde_json::Value = serde_json::from_str(doc).unwrap();

    assert_eq!(string_at(&tree, "escaped"), "a\"b\n c A");
    assert_eq!(
        string_at(&tree, "escaped"),
        reference["escaped"].as_str().unwrap()
    );
}

#[test]
fn test_all_simple_escapes() {
    let doc = r#"{"s":"\" \\ \/ \b \f \n \r \t"}"#;
    let reference: serde_json::Value = serde_json::from_str(doc).unwrap();
    assert_eq!(
        string_at(&parsed(doc), "s"),
        reference["s"].as_str().unwrap()
    );
}

#[test]
fn test_unicode_escapes() {
    assert_eq!(string_at(&parsed(r#"{"s":"\u0041\u0042\u0043"}"#), "s"), "ABC");
    assert_eq!(string_at(&parsed(r#"{"s":"\u00e9t\u00E9"}"#), "s"), "été");
}

#[test]
fn test_surrogate_pair_combined() {
    let doc = r#"{"s":"\ud83d\ude00"}"#;
    let reference: serde_json::Value = serde_json::from_str(doc).unwrap();
    assert_eq!(string_at(&parsed(doc), "s"), "😀");
    assert_eq!(
        string_at(&parsed(doc), "s"),
        reference["s"].as_str().unwrap()
    );
}

#[test]
fn test_lone_surrogate_fails_document() {
    assert!(parse_str(r#"{"s":"x\ud83dy"}"#).is_err());
    assert!(parse_str(r#"{"s":"\ud800"}"#).is_err());
}

#[test]
fn test_raw_utf8_passthrough() {
    assert_eq!(string_at(&parsed(r#"{"s":"こんにちは"}"#), "s"), "こんにちは");
}

// ============================================================================
// NUMBERS
// ============================================================================

#[test]
fn test_fraction_in_range() {
    let tree = parsed(r#"{"temperature":0.7,"top_p":1.0,"zero":0.0}"#);
    assert_eq!(
        tree.get("temperature"),
        Some(&ValueTree::Number(Number::Fraction(0.7)))
    );
    assert_eq!(
        tree.get("top_p"),
        Some(&ValueTree::Number(Number::Fraction(1.0)))
    );
    assert_eq!(
        tree.get("zero"),
        Some(&ValueTree::Number(Number::Fraction(0.0)))
    );
}

#[test]
fn test_fraction_out_of_range_rejects_value_only() {
    let tree = parsed(r#"{"temperature":1.5,"negative":-0.2,"max_tokens":512}"#);
    assert_eq!(
        tree.get("temperature"),
        Some(&ValueTree::Rejected("1.5".to_string()))
    );
    assert_eq!(
        tree.get("negative"),
        Some(&ValueTree::Rejected("-0.2".to_string()))
    );
    assert_eq!(
        tree.get("max_tokens"),
        Some(&ValueTree::Number(Number::Integer(512)))
    );
}

#[test]
fn test_exponent_is_fractional() {
    let tree = parsed(r#"{"a":5e-1,"b":2E3}"#);
    assert_eq!(tree.get("a"), Some(&ValueTree::Number(Number::Fraction(0.5))));
    assert!(matches!(tree.get("b"), Some(ValueTree::Rejected(_))));
}

#[test]
fn test_integers_unrestricted() {
    let tree = parsed(r#"[-7, 0, 9223372036854775807, 9223372036854775808]"#);
    assert_eq!(tree.pointer("0"), Some(&ValueTree::Number(Number::Integer(-7))));
    assert_eq!(
        tree.pointer("2"),
        Some(&ValueTree::Number(Number::Integer(i64::MAX)))
    );
    assert_eq!(
        tree.pointer("3"),
        Some(&ValueTree::Rejected("9223372036854775808".to_string()))
    );
}

// ============================================================================
// MALFORMED INPUT
// ============================================================================

#[test]
fn test_unterminated_string() {
    assert!(matches!(
        parse_str(r#"{"a":"abc"#),
        Err(PayloadError::UnexpectedEnd { .. })
    ));
}

#[test]
fn test_unbalanced_braces() {
    assert!(matches!(
        parse_str(r#"{"a":1"#),
        Err(PayloadError::UnexpectedEnd { .. })
    ));
    assert!(matches!(
        parse_str(r#"{"a":1}}"#),
        Err(PayloadError::Syntax(_))
    ));
}

#[test]
fn test_unexpected_token() {
    assert!(matches!(
        parse_str(r#"{"a":1,}"#),
        Err(PayloadError::Syntax(_))
    ));
    assert!(parse_str(r#"{"a" 1}"#).is_err());
    assert!(parse_str(r#"[1 2]"#).is_err());
    assert!(parse_str("tru").is_err());
    assert!(parse_str("").is_err());
}

#[test]
fn test_invalid_numbers() {
    assert!(parse_str("[01]").is_err());
    assert!(parse_str("[1.]").is_err());
    assert!(parse_str("[-]").is_err());
}

#[test]
fn test_invalid_escape() {
    assert!(matches!(
        parse_str(r#"["\x"]"#),
        Err(PayloadError::Syntax(_))
    ));
    assert!(parse_str(r#"["\u12G4"]"#).is_err());
}

#[test]
fn test_raw_control_character() {
    assert!(matches!(
        parse_str("[\"a\nb\"]"),
        Err(PayloadError::Syntax(_))
    ));
}

#[test]
fn test_invalid_utf8() {
    assert!(parse(&[b'"', 0xFF, b'"']).is_err());
}

#[test]
fn test_depth_limit() {
    let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
    assert!(matches!(parse_str(&deep), Err(PayloadError::Syntax(_))));

    let ok = format!("{}{}", "[".repeat(100), "]".repeat(100));
    assert!(parse_str(&ok).is_ok());
}

#[test]
fn test_number_classification() {
    let tree = parsed(r#"[7, 0.5, 1.5, 5e-1, 2E3, -3, 18446744073709551615]"#);
    assert_eq!(tree.pointer("0"), Some(&ValueTree::Number(Number::Integer(7))));
    assert_eq!(tree.pointer("1"), Some(&ValueTree::Number(Number::Fraction(0.5))));
    assert_eq!(tree.pointer("2"), Some(&ValueTree::Rejected("1.5".to_string())));
    assert_eq!(tree.pointer("3"), Some(&ValueTree::Number(Number::Fraction(0.5))));
    assert!(matches!(tree.pointer("4"), Some(ValueTree::Rejected(_))));
    assert_eq!(tree.pointer("5"), Some(&ValueTree::Number(Number::Integer(-3))));
    assert_eq!(
        tree.pointer("6"),
        Some(&ValueTree::Rejected("18446744073709551615".to_string()))
    );
}

// ============================================================================
// POINTER
// ============================================================================

#[test]
fn test_pointer_misses() {
    let tree = parsed(r#"{"choices":[{"finish_reason":"stop"}],"text":"hi"}"#);
    assert!(tree.pointer("/usage/input_tokens").is_none());
    assert!(tree.pointer("/choices/x/finish_reason").is_none());
    assert!(tree.pointer("/choices/3/finish_reason").is_none());
    assert!(tree.pointer("/text/0").is_none());
}

#[test]
fn test_pointer_tolerates_missing_leading_slash() {
    let tree = parsed(r#"{"inferenceConfig":{"temperature":0.2}}"#);
    assert_eq!(
        tree.pointer("inferenceConfig/temperature"),
        tree.pointer("/inferenceConfig/temperature")
    );
    assert!(tree.pointer("inferenceConfig/temperature").is_some());
}

#[test]
fn test_into_serde_value() {
    let tree = parsed(r#"{"a":[1,0.5,"x",null,false],"b":9.5}"#);
    let value = serde_json::Value::from(&tree);
    assert_eq!(value["a"], serde_json::json!([1, 0.5, "x", null, false]));
    assert!(value["b"].is_null());
}
