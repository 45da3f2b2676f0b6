use std::{collections::HashMap, fmt, sync::Arc};

use super::{DecodeContext, Decoder, expect, fill_array};
use crate::{
    builder::ArrayBuilder,
    error::{DecodeError, Result},
    key::Keyword,
    token::{JsonToken, TokenCursor},
    transform::TagFn,
    value::Value,
};

/// Tag-to-function table for [`TagDispatch::Table`].
///
/// ```
/// use persistent_json::{TagTable, Value, transform::value_fn};
///
/// let table = TagTable::new().with("#upper", value_fn(|v| match v {
///     Value::String(s) => Value::from(s.to_uppercase()),
///     other => other,
/// }));
/// assert!(table.contains("#upper"));
/// ```
#[derive(Clone, Default)]
pub struct TagTable {
    entries: HashMap<Arc<str>, TagFn>,
}

impl TagTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the function for `tag`.
    #[must_use]
    pub fn with(mut self, tag: &str, f: TagFn) -> Self {
        self.insert(tag, f);
        self
    }

    /// Adds (or replaces) the function for `tag`.
    pub fn insert(&mut self, tag: &str, f: TagFn) {
        self.entries.insert(tag.into(), f);
    }

    /// The function registered for `tag`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&TagFn> {
        self.entries.get(tag)
    }

    /// Returns `true` if `tag` is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tag is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TagTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// How a [`TaggedSequenceDecoder`] recognizes and decodes tagged arrays.
#[derive(Debug, Clone)]
pub enum TagDispatch {
    /// `[tag, "name"]` decodes to the keyword `name`.
    Keyword(Arc<str>),
    /// `[tag, payload]` decodes to `table[tag](payload)`.
    Table(Arc<TagTable>),
    /// Both modes at once. The keyword tag reads its payload exactly as
    /// [`TagDispatch::Keyword`] does and wins over a table entry with the
    /// same tag.
    Combined {
        /// Tag of keyword pairs.
        keyword: Arc<str>,
        /// Functions for every other tag.
        table: Arc<TagTable>,
    },
}

enum Rule<'a> {
    Keyword,
    Apply(&'a TagFn),
}

impl TagDispatch {
    fn rule(&self, tag: &str) -> Option<Rule<'_>> {
        match self {
            Self::Keyword(t) => (**t == *tag).then_some(Rule::Keyword),
            Self::Table(table) => table.get(tag).map(Rule::Apply),
            Self::Combined { keyword, .. } if **keyword == *tag => Some(Rule::Keyword),
            Self::Combined { table, .. } => table.get(tag).map(Rule::Apply),
        }
    }
}

/// Array decoder that turns registered `[tag, payload]` pairs into custom
/// values and decodes every other array as a plain [`Value::Array`].
///
/// The tag is compared against the decoded first element, so it has to be
/// decoded before the decoder knows what the array is. A matching tag
/// requires exactly one payload element; anything else is malformed input.
#[derive(Debug, Clone)]
pub struct TaggedSequenceDecoder {
    dispatch: TagDispatch,
}

impl TaggedSequenceDecoder {
    /// Single-tag mode: `[tag, "name"]` becomes a keyword.
    #[must_use]
    pub fn keyword(tag: &str) -> Self {
        Self {
            dispatch: TagDispatch::Keyword(tag.into()),
        }
    }

    /// Table mode: `[tag, payload]` becomes `table[tag](payload)`.
    #[must_use]
    pub fn with_table(table: impl Into<Arc<TagTable>>) -> Self {
        Self {
            dispatch: TagDispatch::Table(table.into()),
        }
    }

    /// Wraps an existing dispatch.
    #[must_use]
    pub fn new(dispatch: TagDispatch) -> Self {
        Self { dispatch }
    }

    /// The dispatch this decoder uses.
    #[must_use]
    pub fn dispatch(&self) -> &TagDispatch {
        &self.dispatch
    }

    /// Decodes the payload of a matched tag and consumes the closing `]`.
    fn decode_tagged(
        rule: &Rule<'_>,
        cursor: &mut dyn TokenCursor,
        cx: &mut DecodeContext<'_>,
        element: &dyn Decoder,
    ) -> Result<Value> {
        match cursor.current() {
            Some(token) if token.starts_value() => {}
            found => {
                return Err(DecodeError::malformed(
                    "tagged value is missing its payload",
                    found,
                    cursor.position(),
                ));
            }
        }
        let payload = match rule {
            Rule::Keyword => {
                expect(cursor, JsonToken::StringValue, "keyword payload must be a string")?;
                let name = Value::Keyword(Keyword::intern(cursor.text()));
                cursor.advance()?;
                name
            }
            Rule::Apply(_) => element.decode(cursor, cx)?,
        };
        expect(
            cursor,
            JsonToken::EndArray,
            "tagged value must have exactly two elements",
        )?;
        cursor.advance()?;
        match rule {
            Rule::Keyword => Ok(payload),
            Rule::Apply(f) => f(payload).map_err(DecodeError::from),
        }
    }
}

impl Decoder for TaggedSequenceDecoder {
    fn decode(&self, cursor: &mut dyn TokenCursor, cx: &mut DecodeContext<'_>) -> Result<Value> {
        expect(cursor, JsonToken::StartArray, "expected start of array")?;
        cx.nested(cursor, |cursor, cx| {
            let element = cx.any_value_decoder()?;
            let mut builder = ArrayBuilder::new();
            cursor.advance()?;
            if cursor.current() != Some(JsonToken::EndArray) {
                let first = element.decode(cursor, cx)?;
                if let Value::String(tag) = &first {
                    if let Some(rule) = self.dispatch.rule(tag) {
                        tracing::trace!(%tag, "decoding tagged value");
                        return Self::decode_tagged(&rule, cursor, cx, &*element);
                    }
                }
                builder.push(first);
            }
            fill_array(cursor, cx, &*element, None, &mut builder)?;
            Ok(Value::Array(builder.freeze()))
        })
    }
}
