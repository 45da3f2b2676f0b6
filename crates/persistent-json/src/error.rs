use std::{error::Error as StdError, fmt};

use thiserror::Error;

use crate::{
    decode::ExpectedType,
    token::{JsonToken, Position},
};

/// Crate-local result type.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Errors that abort a decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No decoder is registered for a type the input required.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The token stream does not have the structure a decoder expected.
    #[error("malformed input at {position}: {message}, found {}", describe(.found))]
    Malformed {
        /// What the decoder expected.
        message: &'static str,
        /// The offending token, `None` at end of input.
        found: Option<JsonToken>,
        /// Where the offending token starts.
        position: Position,
    },
    /// Arrays and objects are nested deeper than the configured limit.
    #[error("nesting deeper than {limit} levels at {position}")]
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
        /// Where the array or object that crossed the limit starts.
        position: Position,
    },
    /// A user-supplied key, tag or value function failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The tokenizer rejected the input.
    #[error(transparent)]
    Syntax(#[from] CursorError),
}

impl DecodeError {
    pub(crate) fn malformed(
        message: &'static str,
        found: Option<JsonToken>,
        position: Position,
    ) -> Self {
        Self::Malformed {
            message,
            found,
            position,
        }
    }
}

fn describe(found: &Option<JsonToken>) -> String {
    match found {
        Some(token) => token.to_string(),
        None => "end of input".into(),
    }
}

/// No decoder could be resolved for a required type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no decoder registered for {expected}")]
pub struct ConfigurationError {
    /// The type that could not be resolved.
    pub expected: ExpectedType,
}

/// Failure raised by a user-supplied transform function.
///
/// The decoder never inspects or replaces it; the original error is
/// available through [`TransformError::get_ref`] and
/// [`TransformError::into_inner`].
#[derive(Debug)]
pub struct TransformError(Box<dyn StdError + Send + Sync>);

impl TransformError {
    /// Wraps an error raised by a hook.
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(err.into())
    }

    /// Borrows the original error.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }

    /// Returns the original error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl StdError for TransformError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// A tokenizer failure together with where it happened.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{source} at {position}")]
pub struct CursorError {
    /// What went wrong.
    pub source: SyntaxError,
    /// Where it went wrong.
    pub position: Position,
}

/// Lexical and grammatical errors reported by [`StrCursor`](crate::StrCursor).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyntaxError {
    /// A character that cannot appear here.
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    /// An unknown escape such as `\x`.
    #[error("invalid escape sequence at character: '{0}'")]
    InvalidEscapeChar(char),
    /// A non-hex digit inside `\u`.
    #[error("invalid unicode escape sequence at character: '{0}'")]
    InvalidUnicodeEscapeChar(char),
    /// A `\u` escape that does not denote a scalar value (lone surrogate).
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscapeSequence(u32),
    /// Input ended inside a value.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// Non-whitespace input after the root value.
    #[error("trailing characters after the root value")]
    TrailingCharacters,
}

/// Errors raised while writing a value as JSON text.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// JSON has no representation for NaN or infinities.
    #[error("cannot encode non-finite number {0}")]
    NonFiniteNumber(f64),
    /// The key-encode function failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The underlying writer failed.
    #[error("formatter error")]
    Fmt(#[from] fmt::Error),
}
