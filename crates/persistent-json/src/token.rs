//! The token cursor seam between a tokenizer and the decoders.
//!
//! Decoders never look at bytes. They read the kind of the current token,
//! its text, and move strictly forward with [`TokenCursor::advance`].

use std::fmt;

use crate::error::CursorError;

/// The kind of token a cursor is positioned on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JsonToken {
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// An object member name; its text is the unescaped name.
    FieldName,
    /// A string value; its text is the unescaped contents.
    StringValue,
    /// `null`
    NullValue,
    /// Any other scalar (numbers and booleans); its text is the raw literal.
    OtherScalar,
}

impl JsonToken {
    /// Returns `true` if a value can start at this token.
    #[must_use]
    pub fn starts_value(self) -> bool {
        !matches!(self, Self::EndArray | Self::EndObject | Self::FieldName)
    }
}

impl fmt::Display for JsonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StartArray => "start of array",
            Self::EndArray => "end of array",
            Self::StartObject => "start of object",
            Self::EndObject => "end of object",
            Self::FieldName => "field name",
            Self::StringValue => "string",
            Self::NullValue => "null",
            Self::OtherScalar => "scalar",
        })
    }
}

/// Location of a token in the input, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column number, counted in characters.
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A forward-only view over a stream of JSON tokens.
///
/// A fresh cursor has no current token; call [`advance`](Self::advance) once
/// to move onto the first one. `None` after that means the input is
/// exhausted.
pub trait TokenCursor {
    /// The token the cursor is positioned on.
    fn current(&self) -> Option<JsonToken>;

    /// Moves to the next token and returns it.
    ///
    /// # Errors
    ///
    /// Returns a [`CursorError`] if the underlying input is not valid JSON.
    fn advance(&mut self) -> Result<Option<JsonToken>, CursorError>;

    /// Text of the current token. Unescaped for strings and field names, the
    /// raw literal for other scalars, empty for structural tokens.
    fn text(&self) -> &str;

    /// The member name if the cursor is on a [`JsonToken::FieldName`].
    fn field_name(&self) -> Option<&str> {
        (self.current() == Some(JsonToken::FieldName)).then(|| self.text())
    }

    /// Position of the current token.
    fn position(&self) -> Position;
}

/// A pre-recorded sequence of tokens.
///
/// Useful for feeding decoders from a tokenizer that already ran, and for
/// producing token streams that no text tokenizer would accept.
///
/// ```
/// use persistent_json::{JsonToken, TokenCursor, TokenTape};
///
/// let mut tape = TokenTape::new().start_array().scalar("1").end_array();
/// assert_eq!(tape.advance().unwrap(), Some(JsonToken::StartArray));
/// assert_eq!(tape.advance().unwrap(), Some(JsonToken::OtherScalar));
/// assert_eq!(tape.text(), "1");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenTape {
    tokens: Vec<(JsonToken, String)>,
    next: usize,
    current: Option<usize>,
}

impl TokenTape {
    /// Creates an empty tape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token with its text.
    #[must_use]
    pub fn token(mut self, token: JsonToken, text: impl Into<String>) -> Self {
        self.tokens.push((token, text.into()));
        self
    }

    /// Appends `[`.
    #[must_use]
    pub fn start_array(self) -> Self {
        self.token(JsonToken::StartArray, "")
    }

    /// Appends `]`.
    #[must_use]
    pub fn end_array(self) -> Self {
        self.token(JsonToken::EndArray, "")
    }

    /// Appends `{`.
    #[must_use]
    pub fn start_object(self) -> Self {
        self.token(JsonToken::StartObject, "")
    }

    /// Appends `}`.
    #[must_use]
    pub fn end_object(self) -> Self {
        self.token(JsonToken::EndObject, "")
    }

    /// Appends a member name.
    #[must_use]
    pub fn field(self, name: &str) -> Self {
        self.token(JsonToken::FieldName, name)
    }

    /// Appends a string value.
    #[must_use]
    pub fn string(self, s: &str) -> Self {
        self.token(JsonToken::StringValue, s)
    }

    /// Appends `null`.
    #[must_use]
    pub fn null(self) -> Self {
        self.token(JsonToken::NullValue, "null")
    }

    /// Appends a number or boolean literal.
    #[must_use]
    pub fn scalar(self, literal: &str) -> Self {
        self.token(JsonToken::OtherScalar, literal)
    }

    /// Number of recorded tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no tokens were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(JsonToken, String)> for TokenTape {
    fn from_iter<I: IntoIterator<Item = (JsonToken, String)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
            next: 0,
            current: None,
        }
    }
}

impl TokenCursor for TokenTape {
    fn current(&self) -> Option<JsonToken> {
        self.current.map(|i| self.tokens[i].0)
    }

    fn advance(&mut self) -> Result<Option<JsonToken>, CursorError> {
        if self.next < self.tokens.len() {
            self.current = Some(self.next);
            self.next += 1;
        } else {
            self.current = None;
        }
        Ok(self.current())
    }

    fn text(&self) -> &str {
        self.current.map_or("", |i| self.tokens[i].1.as_str())
    }

    fn position(&self) -> Position {
        Position {
            line: 1,
            column: self.current.map_or(self.next, |i| i) + 1,
        }
    }
}
