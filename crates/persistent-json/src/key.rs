//! Map keys and keywords.

use std::{fmt, sync::Arc};

/// A symbolic identifier, optionally qualified by a namespace.
///
/// Keywords compare by value; two keywords interned from the same text are
/// equal and hash alike.
///
/// ```
/// use persistent_json::Keyword;
///
/// let k = Keyword::intern("user/name");
/// assert_eq!(k.namespace(), Some("user"));
/// assert_eq!(k.name(), "name");
/// assert_eq!(k.to_string(), "user/name");
/// assert_eq!(Keyword::intern("/").name(), "/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword {
    namespace: Option<Arc<str>>,
    name: Arc<str>,
}

impl Keyword {
    /// Parses `ns/name` or `name`.
    ///
    /// The text is split on the first `/` only when both sides are
    /// non-empty, so `"/"` and `"a/"` are plain names.
    #[must_use]
    pub fn intern(text: &str) -> Self {
        match text.split_once('/') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Self::new(Some(ns), name),
            _ => Self::new(None, text),
        }
    }

    /// Builds a keyword from its parts.
    #[must_use]
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(Arc::from),
            name: Arc::from(name),
        }
    }

    /// The namespace, if qualified.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The unqualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}/")?;
        }
        f.write_str(&self.name)
    }
}

/// A key in a decoded [`Map`](crate::Map).
///
/// Field names decode to [`Key::String`] unless a key decoder maps them to
/// something else.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// The field name as written.
    String(Arc<str>),
    /// A keyword, typically produced by [`KeywordKeys`](crate::KeywordKeys).
    Keyword(Keyword),
    /// An integer key.
    Integer(i64),
}

impl Key {
    /// Shorthand for a keyword key interned from `text`.
    #[must_use]
    pub fn keyword(text: &str) -> Self {
        Self::Keyword(Keyword::intern(text))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Keyword> for Key {
    fn from(k: Keyword) -> Self {
        Self::Keyword(k)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// The default field-name text for a key.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Keyword(k) => k.fmt(f),
            Self::Integer(n) => n.fmt(f),
        }
    }
}
