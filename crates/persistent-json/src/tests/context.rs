use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rstest::*;

use crate::{
    DecodeContext, DecodeError, Decoder, DecoderRegistry, ExpectedType, JsonToken, Key,
    RegistryBuilder, Result, StrCursor, TaggedSequenceDecoder, TokenCursor, TokenTape, Value,
};

fn decode_counting(registry: &DecoderRegistry, src: &str) -> (Value, usize) {
    let mut cx = registry.context();
    let mut cursor = StrCursor::new(src);
    cursor.advance().unwrap();
    let value = cx.decode(&mut cursor, &ExpectedType::Any).unwrap();
    assert_eq!(cursor.current(), None);
    (value, cx.registry_lookups())
}

#[test]
fn resolutions_are_memoized_per_decode() {
    let registry = DecoderRegistry::default();
    let (_, lookups) = decode_counting(&registry, r#"[[1],[2],{"a":[3]}]"#);
    // any value, array, object, key decoder
    assert_eq!(lookups, 4);
}

#[test]
fn large_arrays_cost_one_lookup_per_type() {
    let registry = DecoderRegistry::default();
    let src = format!("[{}]", vec!["\"s\""; 1_000].join(","));
    let (value, lookups) = decode_counting(&registry, &src);
    assert_eq!(value.as_array().map(rpds::Vector::len), Some(1_000));
    // any value, array, string
    assert_eq!(lookups, 3);
}

#[test]
fn each_decode_gets_a_fresh_context() {
    let registry = DecoderRegistry::default();
    let (_, first) = decode_counting(&registry, "[1]");
    let (_, second) = decode_counting(&registry, "[1]");
    assert_eq!(first, second);
}

#[test]
fn resolve_hands_out_the_registered_instance() {
    let registry = DecoderRegistry::default();
    let mut cx = registry.context();
    let a = cx.resolve(&ExpectedType::Array).unwrap();
    let b = cx.resolve(&ExpectedType::Array).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &registry.find(&ExpectedType::Array).unwrap()));
    assert_eq!(cx.registry_lookups(), 1);
}

#[test]
fn decoder_leaves_cursor_after_its_value() {
    let registry = DecoderRegistry::default();
    let mut cx = registry.context();
    let mut tape = TokenTape::new()
        .start_array()
        .start_array()
        .scalar("1")
        .end_array()
        .string("next")
        .end_array();
    tape.advance().unwrap();
    tape.advance().unwrap();

    let inner = cx.decode(&mut tape, &ExpectedType::Array).unwrap();
    assert_eq!(inner, Value::from_iter([Value::from(1.0)]));
    assert_eq!(tape.current(), Some(JsonToken::StringValue));
    assert_eq!(tape.text(), "next");

    let next = cx.decode(&mut tape, &ExpectedType::Any).unwrap();
    assert_eq!(next, Value::from("next"));
    assert_eq!(tape.current(), Some(JsonToken::EndArray));
}

#[test]
fn each_element_decode_stops_at_the_next_sibling() {
    let registry = DecoderRegistry::default();
    let mut cx = registry.context();
    let mut cursor = StrCursor::new("[1, 2, 3]");
    cursor.advance().unwrap();
    cursor.advance().unwrap();
    let after = [
        Some(JsonToken::OtherScalar),
        Some(JsonToken::OtherScalar),
        Some(JsonToken::EndArray),
    ];
    for (n, next) in (1..=3).zip(after) {
        let value = cx.decode(&mut cursor, &ExpectedType::Any).unwrap();
        assert_eq!(value, Value::from(f64::from(n)));
        assert_eq!(cursor.current(), next);
    }
    assert_eq!(cursor.advance().unwrap(), None);
}

#[test]
fn scalars_consume_exactly_one_token() {
    let registry = DecoderRegistry::default();
    let mut cx = registry.context();
    let mut tape = TokenTape::new().null().scalar("true").string("x");
    tape.advance().unwrap();
    assert_eq!(cx.decode(&mut tape, &ExpectedType::Any).unwrap(), Value::Null);
    assert_eq!(
        cx.decode(&mut tape, &ExpectedType::Any).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        cx.decode(&mut tape, &ExpectedType::String).unwrap(),
        Value::from("x")
    );
    assert_eq!(tape.current(), None);
}

#[derive(Debug)]
struct Point;

impl Decoder for Point {
    fn decode(&self, cursor: &mut dyn TokenCursor, cx: &mut DecodeContext<'_>) -> Result<Value> {
        let fields = cx.decode(cursor, &ExpectedType::Object)?;
        let coord = |name: &str| fields.get(&Key::from(name)).and_then(Value::as_f64);
        match (coord("x"), coord("y")) {
            (Some(x), Some(y)) => Ok(Value::tagged(
                "#point",
                Value::from_iter([Value::from(x), Value::from(y)]),
            )),
            _ => Ok(Value::Null),
        }
    }
}

#[test]
fn named_types_resolve_through_the_registry() {
    let registry = RegistryBuilder::standard()
        .decoder(ExpectedType::named("point"), Arc::new(Point))
        .build();
    let mut cx = registry.context();
    let mut cursor = StrCursor::new(r#"{"x": 1, "y": 2}"#);
    cursor.advance().unwrap();
    let value = cx.decode(&mut cursor, &ExpectedType::named("point")).unwrap();
    assert_eq!(value.to_string(), r##"["#point",[1,2]]"##);
}

#[test]
fn unregistered_type_is_a_configuration_error() {
    let registry = DecoderRegistry::default();
    let mut cx = registry.context();
    let mut cursor = StrCursor::new("{}");
    cursor.advance().unwrap();
    let err = cx
        .decode(&mut cursor, &ExpectedType::named("point"))
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Configuration(ref e) if e.expected == ExpectedType::named("point")
    ));
    insta::assert_snapshot!(err.to_string(), @"no decoder registered for type `point`");
}

#[test]
fn removed_builtin_is_a_configuration_error() {
    let registry = RegistryBuilder::standard()
        .without(&ExpectedType::String)
        .build();
    let (value, _) = decode_counting(&registry, "[1, null]");
    assert_eq!(value.to_string(), "[1,null]");

    let mut cx = registry.context();
    let mut cursor = StrCursor::new(r#"[1, "s"]"#);
    cursor.advance().unwrap();
    let err = cx.decode(&mut cursor, &ExpectedType::Any).unwrap_err();
    assert!(matches!(err, DecodeError::Configuration(_)));
}

#[derive(Debug, Default)]
struct CountingDecoder {
    calls: AtomicUsize,
}

impl Decoder for CountingDecoder {
    fn decode(&self, cursor: &mut dyn TokenCursor, _cx: &mut DecodeContext<'_>) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let value = Value::from(cursor.text());
        cursor.advance()?;
        Ok(value)
    }
}

#[test]
fn replacing_a_builtin_applies_to_nested_values() {
    let strings = Arc::new(CountingDecoder::default());
    let registry = RegistryBuilder::standard()
        .decoder(ExpectedType::String, strings.clone())
        .build();
    let (value, _) = decode_counting(&registry, r#"{"a": ["x", {"b": "y"}], "c": "z"}"#);
    assert_eq!(strings.calls.load(Ordering::Relaxed), 3);
    assert_eq!(value.get(&Key::from("c")), Some(&Value::from("z")));
}

#[test]
fn depth_limit() {
    let registry = RegistryBuilder::standard().max_depth(3).build();
    decode_counting(&registry, "[[[]]]");

    let mut cx = registry.context();
    let mut cursor = StrCursor::new("[[[[]]]]");
    cursor.advance().unwrap();
    let err = cx.decode(&mut cursor, &ExpectedType::Any).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"nesting deeper than 3 levels at 1:4");
}

#[rstest]
#[case::array(TokenTape::new().start_array().scalar("1").end_object(), false)]
#[case::object(TokenTape::new().start_object().field("a").scalar("1").end_array(), false)]
#[case::tagged(TokenTape::new().start_array().string("!kw").scalar("1"), true)]
fn failed_collection_decode_restores_depth(#[case] mut broken: TokenTape, #[case] tagged: bool) {
    let mut registry = RegistryBuilder::standard().max_depth(1);
    if tagged {
        registry = registry.decoder(
            ExpectedType::Array,
            Arc::new(TaggedSequenceDecoder::keyword("!kw")),
        );
    }
    let registry = registry.build();
    let mut cx = registry.context();

    broken.advance().unwrap();
    let err = cx.decode(&mut broken, &ExpectedType::Any).unwrap_err();
    assert!(matches!(err, DecodeError::Malformed { .. }), "{err:?}");
    assert_eq!(cx.depth(), 0);

    // The same context can still go one level deep.
    let mut cursor = StrCursor::new("[2]");
    cursor.advance().unwrap();
    let value = cx.decode(&mut cursor, &ExpectedType::Any).unwrap();
    assert_eq!(value, Value::from_iter([Value::from(2.0)]));
}

/// Reports member names only through `field_name`.
#[derive(Debug)]
struct NamesOnlyByAccessor(TokenTape);

impl TokenCursor for NamesOnlyByAccessor {
    fn current(&self) -> Option<JsonToken> {
        self.0.current()
    }

    fn advance(&mut self) -> std::result::Result<Option<JsonToken>, crate::CursorError> {
        self.0.advance()
    }

    fn text(&self) -> &str {
        match self.0.current() {
            Some(JsonToken::FieldName) => "",
            _ => self.0.text(),
        }
    }

    fn field_name(&self) -> Option<&str> {
        self.0.field_name()
    }

    fn position(&self) -> crate::Position {
        self.0.position()
    }
}

#[test]
fn object_keys_come_from_the_field_name_accessor() {
    let registry = DecoderRegistry::default();
    let mut cx = registry.context();
    let mut cursor = NamesOnlyByAccessor(
        TokenTape::new()
            .start_object()
            .field("a")
            .scalar("1")
            .field("b")
            .null()
            .end_object(),
    );
    cursor.advance().unwrap();
    let value = cx.decode(&mut cursor, &ExpectedType::Any).unwrap();
    assert_eq!(value.get(&Key::from("a")), Some(&Value::from(1.0)));
    assert_eq!(value.get(&Key::from("b")), Some(&Value::Null));
}
