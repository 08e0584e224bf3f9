use ecma_abi::ErrorClass;

use super::*;

#[test]
fn encode_uri_component_escapes_space_and_slash() {
    assert_eq!(encode_uri_component("a b/c"), "a%20b%2Fc");
}

#[test]
fn encode_uri_keeps_reserved_characters_bare() {
    assert_eq!(encode_uri("http://a.b/c d"), "http://a.b/c%20d");
}

#[test]
fn encode_uri_escapes_non_ascii_as_utf8_bytes() {
    // U+00E9 (é) is C3 A9 in UTF-8.
    assert_eq!(encode_uri_component("\u{e9}"), "%C3%A9");
}

#[test]
fn decode_uri_component_reverses_encode_uri_component() {
    assert_eq!(decode_uri_component("a%20b%2Fc").unwrap(), "a b/c");
}

#[test]
fn decode_uri_leaves_reserved_escapes_alone() {
    // `%2F` is reserved for plain decodeURI and must stay percent-encoded.
    assert_eq!(decode_uri("a%20b%2Fc").unwrap(), "a b%2Fc");
}

#[test]
fn decode_uri_rejects_overlong_utf8() {
    let err = decode_uri("%C0%80").unwrap_err();
    assert_eq!(err.class(), ErrorClass::UriError);
}

#[test]
fn decode_uri_rejects_truncated_escape() {
    assert!(decode_uri("%2").is_err());
}

#[test]
fn decode_uri_rejects_invalid_hex() {
    assert!(decode_uri("%zz").is_err());
}

#[test]
fn encode_then_decode_uri_component_round_trips() {
    let input = "h\u{e9}llo, w\u{f6}rld! & \t\n";
    let encoded = encode_uri_component(input);
    assert_eq!(decode_uri_component(&encoded).unwrap(), input);
}

#[test]
fn escape_uses_percent_xx_for_latin1_range() {
    assert_eq!(escape("\u{e9}").unwrap(), "%E9");
}

#[test]
fn escape_uses_percent_u_for_bmp_above_latin1() {
    assert_eq!(escape("\u{1234}").unwrap(), "%u1234");
}

#[test]
fn escape_passes_through_unescaped_set() {
    assert_eq!(escape("Az09@*_+-./").unwrap(), "Az09@*_+-./");
}

#[test]
fn escape_percent_encodes_space() {
    assert_eq!(escape(" ").unwrap(), "%20");
}

#[test]
fn escape_rejects_non_bmp_with_type_error_not_uri_error() {
    let err = escape("\u{1F600}").unwrap_err();
    assert_eq!(err.class(), ErrorClass::TypeError);
}

#[test]
fn unescape_reverses_percent_xx_and_percent_u() {
    assert_eq!(unescape("%E9"), "\u{e9}");
    assert_eq!(unescape("%u1234"), "\u{1234}");
}

#[test]
fn unescape_leaves_unrecognized_percent_literal() {
    assert_eq!(unescape("100% done"), "100% done");
    assert_eq!(unescape("%uZZZZ"), "%uZZZZ");
    assert_eq!(unescape("%2"), "%2");
}

#[test]
fn escape_then_unescape_round_trips_for_bmp_input() {
    let input = "Hello, W\u{f6}rld! 100% \u{1234}";
    let escaped = escape(input).unwrap();
    assert_eq!(unescape(&escaped), input);
}

proptest::proptest! {
    // §8 round-trip law: decodeURIComponent(encodeURIComponent(s)) === s
    // for any string, since encodeURIComponent never leaves a byte that
    // decodeURIComponent treats as reserved.
    #[test]
    fn decode_uri_component_undoes_encode_uri_component(s in ".*") {
        let encoded = encode_uri_component(&s);
        proptest::prop_assert_eq!(decode_uri_component(&encoded).unwrap(), s);
    }
}
