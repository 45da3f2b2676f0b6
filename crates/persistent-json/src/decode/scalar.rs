use std::fmt;

use super::{DecodeContext, Decoder};
use crate::{
    error::{DecodeError, Result, TransformError},
    key::{Key, Keyword},
    token::{JsonToken, TokenCursor},
    transform::KeyFn,
    value::Value,
};

/// The string that [`StringDecoder::with_null_sentinel`] reads as `null`.
pub const NULL_SENTINEL: &str = "null";

/// Decoder for [`ExpectedType::String`](super::ExpectedType::String).
///
/// JSON `null` decodes to [`Value::Null`]. Strings decode verbatim, except
/// that the sentinel variant also maps the four-character string `"null"`
/// to [`Value::Null`]. Numbers and booleans decode to their literal text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StringDecoder {
    null_sentinel: bool,
}

impl StringDecoder {
    /// Strings are returned exactly as written.
    #[must_use]
    pub const fn verbatim() -> Self {
        Self {
            null_sentinel: false,
        }
    }

    /// The string `"null"` is read as `null`.
    #[must_use]
    pub const fn with_null_sentinel() -> Self {
        Self {
            null_sentinel: true,
        }
    }
}

impl Decoder for StringDecoder {
    fn decode(&self, cursor: &mut dyn TokenCursor, _cx: &mut DecodeContext<'_>) -> Result<Value> {
        let value = match cursor.current() {
            Some(JsonToken::NullValue) => Value::Null,
            Some(JsonToken::StringValue) if self.null_sentinel && cursor.text() == NULL_SENTINEL => {
                Value::Null
            }
            Some(JsonToken::StringValue | JsonToken::OtherScalar) => Value::String(cursor.text().into()),
            found => {
                return Err(DecodeError::malformed(
                    "expected a string",
                    found,
                    cursor.position(),
                ));
            }
        };
        cursor.advance()?;
        Ok(value)
    }
}

/// Maps object field names to [`Key`]s.
pub trait KeyDecoder: fmt::Debug + Send + Sync {
    /// Decodes one field name.
    ///
    /// # Errors
    ///
    /// Whatever the underlying transform reports.
    fn decode_key(&self, name: &str) -> Result<Key, TransformError>;
}

/// Keeps field names as [`Key::String`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StringKeys;

impl KeyDecoder for StringKeys {
    fn decode_key(&self, name: &str) -> Result<Key, TransformError> {
        Ok(Key::String(name.into()))
    }
}

/// Interns field names as [`Key::Keyword`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeywordKeys;

impl KeyDecoder for KeywordKeys {
    fn decode_key(&self, name: &str) -> Result<Key, TransformError> {
        Ok(Key::Keyword(Keyword::intern(name)))
    }
}

/// Runs a user [`KeyFn`] on every field name.
#[derive(Clone)]
pub struct FnKeyDecoder {
    f: KeyFn,
}

impl FnKeyDecoder {
    /// Wraps a key function.
    #[must_use]
    pub fn new(f: KeyFn) -> Self {
        Self { f }
    }
}

impl fmt::Debug for FnKeyDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKeyDecoder").finish_non_exhaustive()
    }
}

impl From<KeyFn> for FnKeyDecoder {
    fn from(f: KeyFn) -> Self {
        Self::new(f)
    }
}

impl KeyDecoder for FnKeyDecoder {
    fn decode_key(&self, name: &str) -> Result<Key, TransformError> {
        (self.f)(name)
    }
}
