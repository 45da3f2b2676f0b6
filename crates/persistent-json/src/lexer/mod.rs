//! A forward-only tokenizer over an in-memory JSON document.
//!
//! [`StrCursor`] is the reference [`TokenCursor`]: it validates the JSON
//! grammar as it goes, so decoders fed from it only ever see well-nested
//! token streams. Strings are unescaped into a reusable buffer; numbers and
//! booleans are handed over as their raw literal text.
//!
//! Invariants
//! - `position` always refers to the first character of the current token.
//! - After the root value is closed the cursor yields `None`, or
//!   [`SyntaxError::TrailingCharacters`] if anything but whitespace follows.

use crate::{
    error::{CursorError, SyntaxError},
    token::{JsonToken, Position, TokenCursor},
};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Array,
    Object,
}

/// What the grammar allows next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Before the root value.
    Start,
    /// Right after `[`: a value or `]`.
    ArrayStart,
    /// Right after `{`: a member name or `}`.
    ObjectStart,
    /// After a member name: `:` then a value.
    AfterKey,
    /// After a complete value: `,`, a closing bracket, or end of input.
    AfterValue,
}

/// Tokenizer over a borrowed `&str`.
///
/// ```
/// use persistent_json::{JsonToken, StrCursor, TokenCursor};
///
/// let mut cursor = StrCursor::new(r#"{"a": [true]}"#);
/// let mut tokens = vec![];
/// while let Some(token) = cursor.advance().unwrap() {
///     tokens.push(token);
/// }
/// assert_eq!(
///     tokens,
///     [
///         JsonToken::StartObject,
///         JsonToken::FieldName,
///         JsonToken::StartArray,
///         JsonToken::OtherScalar,
///         JsonToken::EndArray,
///         JsonToken::EndObject,
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StrCursor<'src> {
    src: &'src str,
    pos: usize,
    line: usize,
    column: usize,
    /// Position of the character consumed last.
    prev: Position,
    token: Option<JsonToken>,
    token_pos: Position,
    text: String,
    stack: Vec<Frame>,
    state: State,
}

impl<'src> StrCursor<'src> {
    /// Creates a cursor positioned before the first token of `src`.
    #[must_use]
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            prev: Position::default(),
            token: None,
            token_pos: Position::default(),
            text: String::new(),
            stack: Vec::new(),
            state: State::Start,
        }
    }

    /// Number of arrays and objects currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.prev = self.here();
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    fn mark(&mut self) {
        self.token_pos = self.here();
        self.text.clear();
    }

    fn eof(&self) -> CursorError {
        CursorError {
            source: SyntaxError::UnexpectedEndOfInput,
            position: self.here(),
        }
    }

    /// Error for the character consumed last.
    fn invalid(&self, source: SyntaxError) -> CursorError {
        CursorError {
            source,
            position: self.prev,
        }
    }

    fn next_token(&mut self) -> Result<Option<JsonToken>, CursorError> {
        self.skip_whitespace();
        self.mark();
        match self.state {
            State::Start => self.value().map(Some),
            State::ArrayStart if self.peek() == Some(']') => {
                self.bump();
                Ok(Some(self.close(JsonToken::EndArray)))
            }
            State::ArrayStart => self.value().map(Some),
            State::ObjectStart if self.peek() == Some('}') => {
                self.bump();
                Ok(Some(self.close(JsonToken::EndObject)))
            }
            State::ObjectStart => self.key().map(Some),
            State::AfterKey => match self.bump() {
                Some(':') => {
                    self.skip_whitespace();
                    self.value().map(Some)
                }
                Some(c) => Err(self.invalid(SyntaxError::InvalidCharacter(c))),
                None => Err(self.eof()),
            },
            State::AfterValue => {
                let Some(&frame) = self.stack.last() else {
                    return match self.peek() {
                        None => Ok(None),
                        Some(_) => Err(CursorError {
                            source: SyntaxError::TrailingCharacters,
                            position: self.here(),
                        }),
                    };
                };
                match (self.bump(), frame) {
                    (Some(','), Frame::Array) => {
                        self.skip_whitespace();
                        self.value().map(Some)
                    }
                    (Some(','), Frame::Object) => {
                        self.skip_whitespace();
                        self.key().map(Some)
                    }
                    (Some(']'), Frame::Array) => Ok(Some(self.close(JsonToken::EndArray))),
                    (Some('}'), Frame::Object) => Ok(Some(self.close(JsonToken::EndObject))),
                    (Some(c), _) => Err(self.invalid(SyntaxError::InvalidCharacter(c))),
                    (None, _) => Err(self.eof()),
                }
            }
        }
    }

    fn close(&mut self, token: JsonToken) -> JsonToken {
        self.stack.pop();
        self.state = State::AfterValue;
        token
    }

    fn key(&mut self) -> Result<JsonToken, CursorError> {
        self.mark();
        match self.bump() {
            Some('"') => {
                self.string()?;
                self.state = State::AfterKey;
                Ok(JsonToken::FieldName)
            }
            Some(c) => Err(self.invalid(SyntaxError::InvalidCharacter(c))),
            None => Err(self.eof()),
        }
    }

    fn value(&mut self) -> Result<JsonToken, CursorError> {
        self.mark();
        let token = match self.bump() {
            Some('[') => {
                self.stack.push(Frame::Array);
                self.state = State::ArrayStart;
                return Ok(JsonToken::StartArray);
            }
            Some('{') => {
                self.stack.push(Frame::Object);
                self.state = State::ObjectStart;
                return Ok(JsonToken::StartObject);
            }
            Some('"') => {
                self.string()?;
                JsonToken::StringValue
            }
            Some('n') => {
                self.literal("null")?;
                JsonToken::NullValue
            }
            Some('t') => {
                self.literal("true")?;
                JsonToken::OtherScalar
            }
            Some('f') => {
                self.literal("false")?;
                JsonToken::OtherScalar
            }
            Some(c @ ('-' | '0'..='9')) => {
                self.number(c)?;
                JsonToken::OtherScalar
            }
            Some(c) => return Err(self.invalid(SyntaxError::InvalidCharacter(c))),
            None => return Err(self.eof()),
        };
        self.state = State::AfterValue;
        Ok(token)
    }

    /// Consumes the rest of `word`, whose first character was already read.
    fn literal(&mut self, word: &'static str) -> Result<(), CursorError> {
        for expected in word.chars().skip(1) {
            match self.bump() {
                Some(c) if c == expected => {}
                Some(c) => return Err(self.invalid(SyntaxError::InvalidCharacter(c))),
                None => return Err(self.eof()),
            }
        }
        self.text.push_str(word);
        Ok(())
    }

    fn digit(&mut self) -> Result<(), CursorError> {
        match self.bump() {
            Some(c) if c.is_ascii_digit() => {
                self.text.push(c);
                Ok(())
            }
            Some(c) => Err(self.invalid(SyntaxError::InvalidCharacter(c))),
            None => Err(self.eof()),
        }
    }

    fn digits(&mut self) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            self.bump();
            self.text.push(c);
        }
    }

    fn number(&mut self, first: char) -> Result<(), CursorError> {
        self.text.push(first);
        if first == '-' {
            self.digit()?;
        }
        if self.text.ends_with('0') {
            if let Some(c) = self.peek().filter(char::is_ascii_digit) {
                self.bump();
                return Err(self.invalid(SyntaxError::InvalidCharacter(c)));
            }
        } else {
            self.digits();
        }
        if self.peek() == Some('.') {
            self.bump();
            self.text.push('.');
            self.digit()?;
            self.digits();
        }
        if let Some(e @ ('e' | 'E')) = self.peek() {
            self.bump();
            self.text.push(e);
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.bump();
                self.text.push(sign);
            }
            self.digit()?;
            self.digits();
        }
        Ok(())
    }

    /// Reads string contents up to the closing quote, unescaping into `text`.
    fn string(&mut self) -> Result<(), CursorError> {
        loop {
            match self.bump() {
                None => return Err(self.eof()),
                Some('"') => return Ok(()),
                Some('\\') => {
                    let c = self.escape()?;
                    self.text.push(c);
                }
                Some(c) if c < '\u{20}' => {
                    return Err(self.invalid(SyntaxError::InvalidCharacter(c)));
                }
                Some(c) => self.text.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, CursorError> {
        let c = match self.bump() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => return self.unicode_escape(),
            Some(c) => return Err(self.invalid(SyntaxError::InvalidEscapeChar(c))),
            None => return Err(self.eof()),
        };
        Ok(c)
    }

    fn unicode_escape(&mut self) -> Result<char, CursorError> {
        let start = self.prev;
        let high = self.hex4()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if self.bump() != Some('\\') || self.bump() != Some('u') {
                    return Err(CursorError {
                        source: SyntaxError::InvalidUnicodeEscapeSequence(high),
                        position: start,
                    });
                }
                let low = self.hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(CursorError {
                        source: SyntaxError::InvalidUnicodeEscapeSequence(low),
                        position: start,
                    });
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            _ => high,
        };
        char::from_u32(code).ok_or(CursorError {
            source: SyntaxError::InvalidUnicodeEscapeSequence(code),
            position: start,
        })
    }

    fn hex4(&mut self) -> Result<u32, CursorError> {
        let mut code = 0;
        for _ in 0..4 {
            match self.bump() {
                Some(c) => match c.to_digit(16) {
                    Some(d) => code = code * 16 + d,
                    None => return Err(self.invalid(SyntaxError::InvalidUnicodeEscapeChar(c))),
                },
                None => return Err(self.eof()),
            }
        }
        Ok(code)
    }
}

impl TokenCursor for StrCursor<'_> {
    fn current(&self) -> Option<JsonToken> {
        self.token
    }

    fn advance(&mut self) -> Result<Option<JsonToken>, CursorError> {
        self.token = self.next_token()?;
        Ok(self.token)
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn position(&self) -> Position {
        self.token_pos
    }
}
