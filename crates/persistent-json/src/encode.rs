//! Writing values back out as JSON text.
//!
//! The encoder mirrors the decoder's hooks: map keys go through an optional
//! key-encode function, keywords are written either as plain strings or as
//! `[tag, "name"]` when a keyword tag is configured, and extensions are
//! written as `[tag, payload]`.

use std::{fmt, fmt::Write as _};

use crate::{
    error::EncodeError,
    key::{Key, Keyword},
    transform::KeyEncodeFn,
    value::Value,
};

/// Configurable JSON writer.
///
/// ```
/// use persistent_json::{Encoder, Key, Keyword, Value};
///
/// let v: Value = [(Key::keyword("a"), Value::from(Keyword::intern("b")))]
///     .into_iter()
///     .collect();
/// let json = Encoder::new().with_keyword_tag("!kw").encode_to_string(&v).unwrap();
/// assert_eq!(json, r#"{"a":["!kw","b"]}"#);
/// ```
#[derive(Clone, Default)]
pub struct Encoder {
    key_fn: Option<KeyEncodeFn>,
    keyword_tag: Option<String>,
    lenient: bool,
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("key_fn", &self.key_fn.is_some())
            .field("keyword_tag", &self.keyword_tag)
            .field("lenient", &self.lenient)
            .finish()
    }
}

impl Encoder {
    /// Writes keys with their default text and keywords as strings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes non-finite numbers as `null` instead of failing. Used by
    /// `Display for Value`.
    pub(crate) fn lenient() -> Self {
        Self {
            lenient: true,
            ..Self::default()
        }
    }

    /// Runs every map key through `f`.
    #[must_use]
    pub fn with_key_fn(mut self, f: KeyEncodeFn) -> Self {
        self.key_fn = Some(f);
        self
    }

    /// Writes keyword values as `[tag, "name"]`.
    #[must_use]
    pub fn with_keyword_tag(mut self, tag: &str) -> Self {
        self.keyword_tag = Some(tag.into());
        self
    }

    /// Encodes `value` into a new string.
    ///
    /// # Errors
    ///
    /// See [`EncodeError`].
    pub fn encode_to_string(&self, value: &Value) -> Result<String, EncodeError> {
        let mut out = String::new();
        self.write(value, &mut out)?;
        Ok(out)
    }

    /// Encodes `value` into `out`.
    ///
    /// # Errors
    ///
    /// See [`EncodeError`].
    pub fn write<W: fmt::Write + ?Sized>(&self, value: &Value, out: &mut W) -> Result<(), EncodeError> {
        match value {
            Value::Null => out.write_str("null")?,
            Value::Boolean(b) => out.write_str(if *b { "true" } else { "false" })?,
            Value::Number(n) if n.is_finite() => write!(out, "{n}")?,
            Value::Number(_) if self.lenient => out.write_str("null")?,
            Value::Number(n) => return Err(EncodeError::NonFiniteNumber(*n)),
            Value::String(s) => write_string(s, out)?,
            Value::Keyword(k) => self.write_keyword(k, out)?,
            Value::Array(items) => {
                out.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.write_char(',')?;
                    }
                    self.write(item, out)?;
                }
                out.write_char(']')?;
            }
            Value::Object(map) => {
                out.write_char('{')?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.write_char(',')?;
                    }
                    self.write_key(key, out)?;
                    out.write_char(':')?;
                    self.write(item, out)?;
                }
                out.write_char('}')?;
            }
            Value::Extension(ext) => {
                out.write_char('[')?;
                write_string(ext.tag(), out)?;
                out.write_char(',')?;
                self.write(&ext.payload(), out)?;
                out.write_char(']')?;
            }
        }
        Ok(())
    }

    fn write_key<W: fmt::Write + ?Sized>(&self, key: &Key, out: &mut W) -> Result<(), EncodeError> {
        match &self.key_fn {
            Some(f) => write_string(&f(key)?, out)?,
            None => write_string(&key.to_string(), out)?,
        }
        Ok(())
    }

    fn write_keyword<W: fmt::Write + ?Sized>(&self, k: &Keyword, out: &mut W) -> fmt::Result {
        let name = k.to_string();
        match &self.keyword_tag {
            Some(tag) => {
                out.write_char('[')?;
                write_string(tag, out)?;
                out.write_char(',')?;
                write_string(&name, out)?;
                out.write_char(']')
            }
            None => write_string(&name, out),
        }
    }
}

/// Writes `src` as a quoted JSON string literal.
///
/// Quotes, backslashes, control characters (<= U+001F and other BMP
/// controls) and the Unicode line separators are escaped.
pub(crate) fn write_string<W: fmt::Write + ?Sized>(src: &str, out: &mut W) -> fmt::Result {
    out.write_char('"')?;
    for c in src.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            // pre-2019 JSON parsers reject raw line separators
            '\u{2028}' | '\u{2029}' => write!(out, "\\u{:04X}", c as u32)?,
            c if c.is_control() && (c as u32) <= 0xFFFF => write!(out, "\\u{:04X}", c as u32)?,
            _ => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
