//! The configured entry point: read JSON text into values and write values
//! back out.

use std::{fmt, sync::Arc};

use crate::{
    decode::{
        DecoderRegistry, ExpectedType, FnKeyDecoder, KeyDecoder, KeywordKeys, RegistryBuilder,
        Decoder, StringDecoder, TagDispatch, TagTable, TaggedSequenceDecoder,
    },
    encode::Encoder,
    error::{DecodeError, EncodeError, Result},
    lexer::StrCursor,
    token::TokenCursor,
    transform::{KeyEncodeFn, KeyFn},
    value::Value,
};

/// Decoder registry and encoder configured together.
///
/// A mapper is immutable and cheap to clone; share one across threads and
/// call it concurrently. Every call gets its own
/// [`DecodeContext`](crate::DecodeContext).
///
/// ```
/// use persistent_json::{Key, Mapper, Value};
///
/// let mapper = Mapper::builder().keyword_keys().build();
/// let v = mapper.read_str(r#"{"a": [1, "x"]}"#).unwrap();
/// assert_eq!(
///     v.get(&Key::keyword("a")),
///     Some(&Value::from_iter([Value::from(1.0), Value::from("x")]))
/// );
/// assert_eq!(mapper.write_string(&v).unwrap(), r#"{"a":[1,"x"]}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    registry: Arc<DecoderRegistry>,
    encoder: Encoder,
}

impl Mapper {
    /// A mapper with the standard decoders, string keys and no tags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts configuring a mapper.
    #[must_use]
    pub fn builder() -> MapperBuilder {
        MapperBuilder::default()
    }

    /// The registry decodes resolve against.
    #[must_use]
    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// The encoder used by [`write_string`](Self::write_string).
    #[must_use]
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Decodes one JSON document.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`], including syntax errors and trailing input.
    pub fn read_str(&self, input: &str) -> Result<Value> {
        self.read_as(input, &ExpectedType::Any)
    }

    /// Decodes one JSON document with the decoder registered for `expected`.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`], including syntax errors and trailing input.
    pub fn read_as(&self, input: &str, expected: &ExpectedType) -> Result<Value> {
        let mut cursor = StrCursor::new(input);
        cursor.advance()?;
        let value = self.decode(&mut cursor, expected)?;
        if let found @ Some(_) = cursor.current() {
            return Err(DecodeError::malformed(
                "expected end of input",
                found,
                cursor.position(),
            ));
        }
        Ok(value)
    }

    /// Decodes the value starting at the cursor's current token, leaving
    /// the cursor on the token after it.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`].
    pub fn decode(&self, cursor: &mut dyn TokenCursor, expected: &ExpectedType) -> Result<Value> {
        let mut cx = self.registry.context();
        cx.decode(cursor, expected)
    }

    /// Encodes `value` as compact JSON.
    ///
    /// # Errors
    ///
    /// See [`EncodeError`].
    pub fn write_string(&self, value: &Value) -> Result<String, EncodeError> {
        self.encoder.encode_to_string(value)
    }
}

/// Options for a [`Mapper`].
///
/// All options are off by default: field names stay strings, arrays are
/// never reinterpreted, `"null"` is an ordinary string.
#[derive(Default)]
pub struct MapperBuilder {
    decoders: Vec<(ExpectedType, Arc<dyn Decoder>)>,
    key_decoder: Option<Arc<dyn KeyDecoder>>,
    key_encoder: Option<KeyEncodeFn>,
    keyword_tag: Option<String>,
    tags: Option<TagTable>,
    null_sentinel_strings: bool,
    max_depth: Option<usize>,
}

impl fmt::Debug for MapperBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperBuilder")
            .field("decoders", &self.decoders)
            .field("key_decoder", &self.key_decoder)
            .field("key_encoder", &self.key_encoder.is_some())
            .field("keyword_tag", &self.keyword_tag)
            .field("tags", &self.tags)
            .field("null_sentinel_strings", &self.null_sentinel_strings)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl MapperBuilder {
    /// Decodes field names with `f`.
    #[must_use]
    pub fn decode_key_fn(mut self, f: KeyFn) -> Self {
        self.key_decoder = Some(Arc::new(FnKeyDecoder::new(f)));
        self
    }

    /// Decodes field names as keywords.
    #[must_use]
    pub fn keyword_keys(mut self) -> Self {
        self.key_decoder = Some(Arc::new(KeywordKeys));
        self
    }

    /// Encodes map keys with `f`.
    #[must_use]
    pub fn encode_key_fn(mut self, f: KeyEncodeFn) -> Self {
        self.key_encoder = Some(f);
        self
    }

    /// Reads `[tag, "name"]` as the keyword `name` and writes keywords the
    /// same way.
    #[must_use]
    pub fn keyword_tag(mut self, tag: &str) -> Self {
        self.keyword_tag = Some(tag.into());
        self
    }

    /// Reads `[tag, payload]` as `table[tag](payload)` for every tag in the
    /// table.
    #[must_use]
    pub fn tag_decoders(mut self, table: TagTable) -> Self {
        self.tags = Some(table);
        self
    }

    /// Reads the string `"null"` as `null` wherever a string is decoded.
    #[must_use]
    pub fn null_sentinel_strings(mut self) -> Self {
        self.null_sentinel_strings = true;
        self
    }

    /// Limits nesting of arrays and objects.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Registers a decoder for `expected`; it overrides the ones the other
    /// options install.
    #[must_use]
    pub fn decoder(mut self, expected: ExpectedType, decoder: Arc<dyn Decoder>) -> Self {
        self.decoders.push((expected, decoder));
        self
    }

    /// Builds the mapper.
    #[must_use]
    pub fn build(self) -> Mapper {
        let mut registry = RegistryBuilder::standard();
        if self.null_sentinel_strings {
            registry = registry.decoder(
                ExpectedType::String,
                Arc::new(StringDecoder::with_null_sentinel()),
            );
        }
        let dispatch = match (self.keyword_tag.as_deref(), self.tags) {
            (None, None) => None,
            (Some(tag), None) => Some(TagDispatch::Keyword(tag.into())),
            (None, Some(table)) => Some(TagDispatch::Table(Arc::new(table))),
            (Some(tag), Some(table)) => Some(TagDispatch::Combined {
                keyword: tag.into(),
                table: Arc::new(table),
            }),
        };
        if let Some(dispatch) = dispatch {
            registry = registry.decoder(
                ExpectedType::Array,
                Arc::new(TaggedSequenceDecoder::new(dispatch)),
            );
        }
        if let Some(keys) = self.key_decoder {
            registry = registry.key_decoder(keys);
        }
        if let Some(max_depth) = self.max_depth {
            registry = registry.max_depth(max_depth);
        }
        for (expected, decoder) in self.decoders {
            registry = registry.decoder(expected, decoder);
        }

        let mut encoder = Encoder::new();
        if let Some(f) = self.key_encoder {
            encoder = encoder.with_key_fn(f);
        }
        if let Some(tag) = &self.keyword_tag {
            encoder = encoder.with_keyword_tag(tag);
        }

        let registry = registry.build();
        tracing::debug!(max_depth = registry.max_depth(), "built mapper");
        Mapper {
            registry: Arc::new(registry),
            encoder,
        }
    }
}
