use std::fmt;

use super::{DecodeContext, Decoder, expect, fill_array};
use crate::{
    builder::{ArrayBuilder, MapBuilder},
    error::{DecodeError, Result},
    token::{JsonToken, TokenCursor},
    transform::ValueFn,
    value::Value,
};

/// Decodes a JSON array into [`Value::Array`].
///
/// Elements are decoded with the context's any-value decoder, resolved once
/// per array. An optional element function is applied to each decoded
/// element before it is pushed.
#[derive(Clone, Default)]
pub struct SequenceDecoder {
    element_fn: Option<ValueFn>,
}

impl SequenceDecoder {
    /// Pushes elements as decoded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `f(element)` for every element.
    #[must_use]
    pub fn with_element_fn(f: ValueFn) -> Self {
        Self {
            element_fn: Some(f),
        }
    }
}

impl fmt::Debug for SequenceDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceDecoder")
            .field("element_fn", &self.element_fn.is_some())
            .finish()
    }
}

impl Decoder for SequenceDecoder {
    fn decode(&self, cursor: &mut dyn TokenCursor, cx: &mut DecodeContext<'_>) -> Result<Value> {
        expect(cursor, JsonToken::StartArray, "expected start of array")?;
        cx.nested(cursor, |cursor, cx| {
            let element = cx.any_value_decoder()?;
            let mut builder = ArrayBuilder::new();
            cursor.advance()?;
            fill_array(
                cursor,
                cx,
                &*element,
                self.element_fn.as_ref(),
                &mut builder,
            )?;
            Ok(Value::Array(builder.freeze()))
        })
    }
}

/// Decodes a JSON object into [`Value::Object`].
///
/// Field names go through the context's key decoder, values through its
/// any-value decoder; both are resolved once per object. A repeated key
/// keeps the value that appears last.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MappingDecoder;

impl Decoder for MappingDecoder {
    fn decode(&self, cursor: &mut dyn TokenCursor, cx: &mut DecodeContext<'_>) -> Result<Value> {
        expect(cursor, JsonToken::StartObject, "expected start of object")?;
        cx.nested(cursor, |cursor, cx| {
            let keys = cx.key_decoder();
            let values = cx.any_value_decoder()?;
            let mut builder = MapBuilder::new();
            cursor.advance()?;
            loop {
                match cursor.current() {
                    Some(JsonToken::EndObject) => {
                        cursor.advance()?;
                        break;
                    }
                    Some(JsonToken::FieldName) => {
                        let key = match cursor.field_name() {
                            Some(name) => keys.decode_key(name)?,
                            None => {
                                return Err(DecodeError::malformed(
                                    "expected a field name or end of object",
                                    cursor.current(),
                                    cursor.position(),
                                ));
                            }
                        };
                        match cursor.advance()? {
                            Some(token) if token.starts_value() => {}
                            found => {
                                return Err(DecodeError::malformed(
                                    "expected a value after field name",
                                    found,
                                    cursor.position(),
                                ));
                            }
                        }
                        let value = values.decode(cursor, cx)?;
                        builder.put(key, value);
                    }
                    found => {
                        return Err(DecodeError::malformed(
                            "expected a field name or end of object",
                            found,
                            cursor.position(),
                        ));
                    }
                }
            }
            Ok(Value::Object(builder.freeze()))
        })
    }
}
