use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rstest::*;

use crate::{
    DecodeError, ExpectedType, Key, Keyword, Mapper, TagDispatch, TagTable,
    TaggedSequenceDecoder, TransformError, Value, transform::value_fn,
};

fn keyword_mapper() -> Mapper {
    Mapper::builder().keyword_tag("!kw").build()
}

fn point(payload: Value) -> Result<Value, TransformError> {
    let coords = payload
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| TransformError::new(format!("not a point: {payload}")))?;
    Ok(Value::tagged("#point", Value::Array(coords.clone())))
}

fn table_mapper() -> Mapper {
    Mapper::builder()
        .tag_decoders(TagTable::new().with("#point", Arc::new(point)))
        .build()
}

#[rstest]
#[case::plain(r#"["!kw", "ready"]"#, Keyword::new(None, "ready"))]
#[case::qualified(r#"["!kw", "job/state"]"#, Keyword::new(Some("job"), "state"))]
fn keyword_tag(#[case] src: &str, #[case] expected: Keyword) {
    assert_eq!(keyword_mapper().read_str(src).unwrap(), Value::Keyword(expected));
}

#[rstest]
#[case::empty("[]", "[]")]
#[case::not_a_tag(r#"["!kx", "a"]"#, r#"["!kx","a"]"#)]
#[case::tag_not_first(r#"[1, "!kw", "a"]"#, r#"[1,"!kw","a"]"#)]
#[case::non_string_first("[[1], 2]", "[[1],2]")]
#[case::single_non_tag(r#"["a"]"#, r#"["a"]"#)]
fn untagged_arrays_fall_through(#[case] src: &str, #[case] expected: &str) {
    let value = keyword_mapper().read_str(src).unwrap();
    assert_eq!(value.to_string(), expected);
}

#[test]
fn keyword_tags_apply_at_any_depth() {
    let mapper = Mapper::builder().keyword_keys().keyword_tag("!kw").build();
    let value = mapper
        .read_str(r#"{"jobs": [{"state": ["!kw", "done"]}, ["!kw", "x"]]}"#)
        .unwrap();
    let jobs = value.get(&Key::keyword("jobs")).unwrap().as_array().unwrap();
    assert_eq!(
        jobs[0].get(&Key::keyword("state")),
        Some(&Value::Keyword(Keyword::intern("done")))
    );
    assert_eq!(jobs[1], Value::Keyword(Keyword::intern("x")));
    assert_eq!(
        mapper.write_string(&jobs[1]).unwrap(),
        r#"["!kw","x"]"#
    );
}

#[test]
fn keyword_payload_must_be_a_string() {
    let err = keyword_mapper().read_str(r#"["!kw", 1]"#).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"malformed input at 1:9: keyword payload must be a string, found scalar"
    );
}

#[rstest]
#[case::missing_payload(
    r#"["!kw"]"#,
    "malformed input at 1:7: tagged value is missing its payload, found end of array"
)]
#[case::extra_element(
    r#"["!kw", "a", "b"]"#,
    "malformed input at 1:14: tagged value must have exactly two elements, found string"
)]
fn wrong_arity_is_malformed(#[case] src: &str, #[case] message: &str) {
    let err = keyword_mapper().read_str(src).unwrap_err();
    assert!(matches!(err, DecodeError::Malformed { .. }));
    assert_eq!(err.to_string(), message);
}

#[test]
fn table_dispatch() {
    let mapper = table_mapper();
    let value = mapper.read_str(r##"{"at": ["#point", [1, 2]]}"##).unwrap();
    let at = value.get(&Key::from("at")).unwrap();
    let ext = at.as_extension().unwrap();
    assert_eq!(ext.tag(), "#point");
    assert_eq!(ext.payload().to_string(), "[1,2]");
    assert_eq!(mapper.write_string(at).unwrap(), r##"["#point",[1,2]]"##);
}

#[test]
fn unknown_tag_stays_an_array() {
    let value = table_mapper()
        .read_str(r##"["#unknown", [1, 2]]"##)
        .unwrap();
    assert_eq!(value.to_string(), r##"["#unknown",[1,2]]"##);
}

#[test]
fn tag_payload_is_decoded_with_the_registry() {
    let value = table_mapper()
        .read_str(r##"["#point", [["#point", [0, 0]], 1]]"##)
        .unwrap();
    assert_eq!(value.to_string(), r##"["#point",[["#point",[0,0]],1]]"##);
}

#[test]
fn tag_function_errors_are_returned() {
    let err = table_mapper()
        .read_str(r##"["#point", [1]]"##)
        .unwrap_err();
    let DecodeError::Transform(err) = err else {
        panic!("expected a transform error, got {err:?}");
    };
    assert_eq!(err.to_string(), "not a point: [1]");
}

#[rstest]
#[case::missing_payload(r##"["#count"]"##)]
#[case::extra_element(r##"["#count", 1, 2]"##)]
fn tag_function_not_called_on_wrong_arity(#[case] src: &str) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mapper = Mapper::builder()
        .tag_decoders(TagTable::new().with(
            "#count",
            value_fn(move |v| {
                seen.fetch_add(1, Ordering::Relaxed);
                v
            }),
        ))
        .build();
    assert!(mapper.read_str(src).is_err());
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert_eq!(mapper.read_str(r##"["#count", 1]"##).unwrap(), Value::from(1.0));
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn keyword_tag_and_table_combine() {
    let mapper = Mapper::builder()
        .keyword_tag("!kw")
        .tag_decoders(TagTable::new().with("#point", Arc::new(point)))
        .build();
    let value = mapper
        .read_str(r##"[["!kw", "a"], ["#point", [3, 4]]]"##)
        .unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items[0], Value::Keyword(Keyword::intern("a")));
    assert_eq!(items[1].as_extension().map(crate::Ext::tag), Some("#point"));
}

#[test]
fn standalone_decoder_in_a_registry() {
    let decoder = TaggedSequenceDecoder::keyword("~k");
    assert!(matches!(decoder.dispatch(), TagDispatch::Keyword(tag) if &**tag == "~k"));
    let mapper = Mapper::builder()
        .decoder(ExpectedType::Array, Arc::new(decoder))
        .build();
    assert_eq!(
        mapper.read_str(r#"["~k", "v"]"#).unwrap(),
        Value::Keyword(Keyword::intern("v"))
    );
}

fn sentinel_mapper(with_table: bool) -> Mapper {
    let builder = Mapper::builder().keyword_tag("!kw").null_sentinel_strings();
    if with_table {
        builder
            .tag_decoders(TagTable::new().with("#point", Arc::new(point)))
            .build()
    } else {
        builder.build()
    }
}

#[rstest]
fn keyword_payload_ignores_the_string_decoder(#[values(false, true)] with_table: bool) {
    let mapper = sentinel_mapper(with_table);
    let value = mapper.read_str(r#"["!kw", "null"]"#).unwrap();
    assert_eq!(value, Value::Keyword(Keyword::intern("null")));
    assert_eq!(mapper.write_string(&value).unwrap(), r#"["!kw","null"]"#);
    assert_eq!(mapper.read_str(r#"["null", "!kw"]"#).unwrap().to_string(), r#"[null,"!kw"]"#);
}

#[rstest]
fn non_string_keyword_payload_is_malformed(#[values(false, true)] with_table: bool) {
    let err = sentinel_mapper(with_table)
        .read_str(r#"["!kw", 1]"#)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed input at 1:9: keyword payload must be a string, found scalar"
    );
}

#[test]
fn combined_dispatch_prefers_the_keyword_tag() {
    let mapper = Mapper::builder()
        .keyword_tag("!kw")
        .tag_decoders(TagTable::new().with("!kw", value_fn(|_| Value::Null)))
        .build();
    let decoder = mapper.registry().find(&ExpectedType::Array).unwrap();
    assert!(format!("{decoder:?}").contains("Combined"));
    assert_eq!(
        mapper.read_str(r#"["!kw", "a"]"#).unwrap(),
        Value::Keyword(Keyword::intern("a"))
    );
}
