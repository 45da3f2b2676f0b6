//! Decoders and the context they resolve each other through.
//!
//! Every decoder follows the same cursor discipline: it is called with the
//! cursor on the first token of its value and returns with the cursor on
//! the token right after the value's last token. That is what lets array
//! and object decoders hand each element to another decoder without
//! knowing what it is.
//!
//! Decoders never call each other directly. They ask the [`DecodeContext`]
//! for the decoder of an [`ExpectedType`]; the context walks the
//! [`DecoderRegistry`] on the first request and answers later requests from
//! its own cache, so a large array costs one lookup, not one per element.

mod collection;
mod registry;
mod scalar;
mod tagged;

use std::{collections::HashMap, fmt, sync::Arc};

pub use collection::{MappingDecoder, SequenceDecoder};
pub use registry::{DEFAULT_MAX_DEPTH, DecoderRegistry, RegistryBuilder};
pub use scalar::{FnKeyDecoder, KeyDecoder, KeywordKeys, NULL_SENTINEL, StringDecoder, StringKeys};
pub use tagged::{TagDispatch, TagTable, TaggedSequenceDecoder};

use crate::{
    builder::ArrayBuilder,
    error::{DecodeError, Result},
    token::{JsonToken, TokenCursor},
    transform::ValueFn,
    value::Value,
};

/// The type a caller asks a decoder for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpectedType {
    /// Whatever the next token starts.
    Any,
    /// A string (or `null`).
    String,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
    /// An application-defined type registered under a name.
    Named(Arc<str>),
}

impl ExpectedType {
    /// Shorthand for [`ExpectedType::Named`].
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any value"),
            Self::String => f.write_str("string"),
            Self::Array => f.write_str("array"),
            Self::Object => f.write_str("object"),
            Self::Named(name) => write!(f, "type `{name}`"),
        }
    }
}

/// Turns the tokens of one value into a [`Value`].
///
/// Implementations must leave the cursor on the token following the value
/// (see the module documentation) and must not keep state between calls:
/// one instance is shared by every decode that resolves it.
pub trait Decoder: fmt::Debug + Send + Sync {
    /// Decodes the value starting at the cursor's current token.
    ///
    /// # Errors
    ///
    /// Fails if the tokens do not form the expected value, if a dependency
    /// cannot be resolved, or if a hook fails.
    fn decode(&self, cursor: &mut dyn TokenCursor, cx: &mut DecodeContext<'_>) -> Result<Value>;
}

/// State of one top-level decode.
///
/// Created by [`DecoderRegistry::context`], passed down every recursive
/// call, and dropped when the top-level decode returns.
#[derive(Debug)]
pub struct DecodeContext<'r> {
    registry: &'r DecoderRegistry,
    resolved: HashMap<ExpectedType, Arc<dyn Decoder>>,
    key_decoder: Option<Arc<dyn KeyDecoder>>,
    lookups: usize,
    depth: usize,
}

impl<'r> DecodeContext<'r> {
    pub(crate) fn new(registry: &'r DecoderRegistry) -> Self {
        Self {
            registry,
            resolved: HashMap::new(),
            key_decoder: None,
            lookups: 0,
            depth: 0,
        }
    }

    /// Returns the decoder for `expected`, consulting the registry only the
    /// first time a type is requested in this context.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Configuration`] if nothing is registered for the type.
    pub fn resolve(&mut self, expected: &ExpectedType) -> Result<Arc<dyn Decoder>> {
        if let Some(decoder) = self.resolved.get(expected) {
            return Ok(Arc::clone(decoder));
        }
        self.lookups += 1;
        let decoder = self.registry.find(expected)?;
        tracing::trace!(%expected, "resolved decoder");
        self.resolved.insert(expected.clone(), Arc::clone(&decoder));
        Ok(decoder)
    }

    /// The decoder for [`ExpectedType::Any`].
    ///
    /// # Errors
    ///
    /// [`DecodeError::Configuration`] if the registry has no such decoder.
    pub fn any_value_decoder(&mut self) -> Result<Arc<dyn Decoder>> {
        self.resolve(&ExpectedType::Any)
    }

    /// The registry's key decoder, memoized like any other dependency.
    pub fn key_decoder(&mut self) -> Arc<dyn KeyDecoder> {
        if let Some(keys) = &self.key_decoder {
            return Arc::clone(keys);
        }
        self.lookups += 1;
        let keys = self.registry.key_decoder();
        self.key_decoder = Some(Arc::clone(&keys));
        keys
    }

    /// Number of times this context had to consult the registry.
    #[must_use]
    pub fn registry_lookups(&self) -> usize {
        self.lookups
    }

    /// Resolves the decoder for `expected` and runs it on `cursor`.
    ///
    /// # Errors
    ///
    /// Any error from resolution or from the decoder itself.
    pub fn decode(&mut self, cursor: &mut dyn TokenCursor, expected: &ExpectedType) -> Result<Value> {
        let decoder = self.resolve(expected)?;
        decoder.decode(cursor, self)
    }

    /// Enters an array or object.
    ///
    /// # Errors
    ///
    /// [`DecodeError::DepthLimitExceeded`] past the registry's depth limit.
    pub fn descend(&mut self, cursor: &dyn TokenCursor) -> Result<()> {
        let limit = self.registry.max_depth();
        if self.depth >= limit {
            return Err(DecodeError::DepthLimitExceeded {
                limit,
                position: cursor.position(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves an array or object entered with [`descend`](Self::descend).
    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Runs `body` one level deeper, leaving the depth as it found it
    /// whether `body` succeeds or not.
    ///
    /// # Errors
    ///
    /// [`DecodeError::DepthLimitExceeded`] past the depth limit, or any
    /// error from `body`.
    pub fn nested<T>(
        &mut self,
        cursor: &mut dyn TokenCursor,
        body: impl FnOnce(&mut dyn TokenCursor, &mut Self) -> Result<T>,
    ) -> Result<T> {
        self.descend(cursor)?;
        let result = body(cursor, self);
        self.ascend();
        result
    }

    /// Current nesting of arrays and objects.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Decoder for [`ExpectedType::Any`].
///
/// Dispatches on the current token: arrays, objects and strings go to the
/// decoders the context resolves for them, so replacing the `Array` decoder
/// (with a [`TaggedSequenceDecoder`], say) changes nested arrays too.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnyValueDecoder;

impl Decoder for AnyValueDecoder {
    fn decode(&self, cursor: &mut dyn TokenCursor, cx: &mut DecodeContext<'_>) -> Result<Value> {
        match cursor.current() {
            Some(JsonToken::StartArray) => cx.decode(cursor, &ExpectedType::Array),
            Some(JsonToken::StartObject) => cx.decode(cursor, &ExpectedType::Object),
            Some(JsonToken::StringValue) => cx.decode(cursor, &ExpectedType::String),
            Some(JsonToken::NullValue) => {
                cursor.advance()?;
                Ok(Value::Null)
            }
            Some(JsonToken::OtherScalar) => {
                let value = parse_scalar(cursor)?;
                cursor.advance()?;
                Ok(value)
            }
            found => Err(DecodeError::malformed(
                "expected a value",
                found,
                cursor.position(),
            )),
        }
    }
}

fn parse_scalar(cursor: &dyn TokenCursor) -> Result<Value> {
    match cursor.text() {
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        text => text.parse().map(Value::Number).map_err(|_| {
            DecodeError::malformed(
                "expected a number or boolean literal",
                cursor.current(),
                cursor.position(),
            )
        }),
    }
}

/// Fails unless the cursor is on `token`.
pub(crate) fn expect(
    cursor: &dyn TokenCursor,
    token: JsonToken,
    message: &'static str,
) -> Result<()> {
    match cursor.current() {
        Some(t) if t == token => Ok(()),
        found => Err(DecodeError::malformed(message, found, cursor.position())),
    }
}

/// Decodes elements into `builder` until `EndArray`, which is consumed.
pub(crate) fn fill_array(
    cursor: &mut dyn TokenCursor,
    cx: &mut DecodeContext<'_>,
    element: &dyn Decoder,
    element_fn: Option<&ValueFn>,
    builder: &mut ArrayBuilder,
) -> Result<()> {
    loop {
        match cursor.current() {
            Some(JsonToken::EndArray) => {
                cursor.advance()?;
                return Ok(());
            }
            Some(token) if token.starts_value() => {
                let value = element.decode(cursor, cx)?;
                let value = match element_fn {
                    Some(f) => f(value)?,
                    None => value,
                };
                builder.push(value);
            }
            found => {
                return Err(DecodeError::malformed(
                    "expected a value or end of array",
                    found,
                    cursor.position(),
                ));
            }
        }
    }
}
