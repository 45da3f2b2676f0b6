#![no_main]
use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use persistent_json::{DecodeError, Mapper, TagTable, TransformError, Value};

#[derive(Debug, Arbitrary)]
struct Input {
    flags: u8,
    text: String,
}

fn mapper(flags: u8) -> Mapper {
    let mut builder = Mapper::builder();
    if flags & 1 != 0 {
        builder = builder.keyword_keys();
    }
    if flags & 2 != 0 {
        builder = builder.keyword_tag("!kw");
    }
    if flags & 4 != 0 {
        builder = builder.tag_decoders(TagTable::new().with(
            "#t",
            Arc::new(|v: Value| -> Result<Value, TransformError> { Ok(Value::tagged("#t", v)) }),
        ));
    }
    if flags & 8 != 0 {
        builder = builder.null_sentinel_strings();
    }
    builder.build()
}

fn decode(input: &Input) {
    let mapper = mapper(input.flags);
    let decoded = mapper.read_str(&input.text);

    // Whatever serde_json accepts must not be a syntax error here.
    if let Err(DecodeError::Syntax(err)) = &decoded {
        assert!(
            serde_json::from_str::<serde_json::Value>(&input.text).is_err(),
            "rejected valid JSON: {err}"
        );
    }

    // Anything that decodes and encodes must decode to the same value again.
    if let Ok(value) = decoded {
        if let Ok(written) = mapper.write_string(&value) {
            let reread = mapper
                .read_str(&written)
                .unwrap_or_else(|err| panic!("re-reading {written:?} failed: {err}"));
            assert_eq!(reread, value);
        }
    }
}

fuzz_target!(|input: Input| decode(&input));
