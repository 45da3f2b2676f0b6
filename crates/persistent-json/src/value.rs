//! Decoded values.
//!
//! This module defines the [`Value`] enum produced by every decoder, the
//! persistent [`Array`] and [`Map`] collections it is built from, and the
//! [`Extension`] protocol for application types carried inside a value.

use std::{any::Any, fmt, sync::Arc};

use rpds::{HashTrieMapSync, VectorSync};

use crate::{encode::Encoder, key::Key, key::Keyword};

/// Persistent vector of values. Clones share structure.
pub type Array = VectorSync<Value>;

/// Persistent hash map from keys to values. Clones share structure.
pub type Map = HashTrieMapSync<Key, Value>;

/// An immutable decoded JSON value.
///
/// # Examples
///
/// ```
/// use persistent_json::{Key, Value};
///
/// let v: Value = [(Key::from("key"), Value::from("value"))].into_iter().collect();
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// `true` or `false`.
    Boolean(bool),
    /// A JSON number.
    Number(f64),
    /// A JSON string.
    String(Arc<str>),
    /// A symbolic identifier, produced by keyword tags.
    Keyword(Keyword),
    /// A JSON array.
    Array(Array),
    /// A JSON object.
    Object(Map),
    /// An application value decoded from a tagged array.
    Extension(Ext),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v.into())
    }
}

impl From<Keyword> for Value {
    fn from(v: Keyword) -> Self {
        Self::Keyword(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl From<Ext> for Value {
    fn from(v: Ext) -> Self {
        Self::Extension(v)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(Key, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().collect())
    }
}

impl Value {
    /// Returns `true` if the value is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the inner value if this is a [`Value::Boolean`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Boolean(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    /// Returns the number if this is a [`Value::Number`].
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        if let Self::Number(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    /// Borrows the string if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Borrows the keyword if this is a [`Value::Keyword`].
    #[must_use]
    pub fn as_keyword(&self) -> Option<&Keyword> {
        if let Self::Keyword(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Borrows the vector if this is a [`Value::Array`].
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        if let Self::Array(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Borrows the map if this is a [`Value::Object`].
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        if let Self::Object(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Borrows the extension if this is a [`Value::Extension`].
    #[must_use]
    pub fn as_extension(&self) -> Option<&Ext> {
        if let Self::Extension(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Looks up `key` if this is an object.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// Wraps `payload` in the built-in [`Tagged`] extension.
    #[must_use]
    pub fn tagged(tag: &str, payload: Value) -> Self {
        Self::Extension(Ext::new(Tagged::new(tag, payload)))
    }
}

/// Writes the value as compact JSON. Keywords are written as strings and
/// extensions as `[tag, payload]`; non-finite numbers are written as `null`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Encoder::lenient()
            .write(self, f)
            .map_err(|_| fmt::Error)
    }
}

/// An application type that travels through JSON as `[tag, payload]`.
///
/// ```
/// use std::any::Any;
/// use persistent_json::{Ext, Extension, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(f64);
///
/// impl Extension for Celsius {
///     fn tag(&self) -> &str {
///         "#celsius"
///     }
///     fn payload(&self) -> Value {
///         Value::Number(self.0)
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let v = Value::from(Ext::new(Celsius(21.5)));
/// assert_eq!(v.to_string(), r##"["#celsius",21.5]"##);
/// assert_eq!(v.as_extension().unwrap().downcast_ref(), Some(&Celsius(21.5)));
/// ```
pub trait Extension: fmt::Debug + Send + Sync + 'static {
    /// The tag written as the first array element.
    fn tag(&self) -> &str;

    /// The value written as the second array element.
    fn payload(&self) -> Value;

    /// Upcast used for downcasting through [`Ext::downcast_ref`].
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an [`Extension`].
///
/// Two handles are equal when they have the same tag and equal payloads.
#[derive(Clone, Debug)]
pub struct Ext(Arc<dyn Extension>);

impl Ext {
    /// Wraps an extension value.
    pub fn new(ext: impl Extension) -> Self {
        Self(Arc::new(ext))
    }

    /// The extension's tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.0.tag()
    }

    /// The extension's payload.
    #[must_use]
    pub fn payload(&self) -> Value {
        self.0.payload()
    }

    /// Borrows the concrete extension type.
    #[must_use]
    pub fn downcast_ref<E: Extension>(&self) -> Option<&E> {
        self.0.as_any().downcast_ref()
    }
}

impl PartialEq for Ext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.tag() == other.tag() && self.payload() == other.payload())
    }
}

/// A generic tag-plus-payload extension.
#[derive(Clone, Debug, PartialEq)]
pub struct Tagged {
    tag: Arc<str>,
    payload: Value,
}

impl Tagged {
    /// Creates a tagged value.
    #[must_use]
    pub fn new(tag: &str, payload: Value) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }
}

impl Extension for Tagged {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn payload(&self) -> Value {
        self.payload.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
