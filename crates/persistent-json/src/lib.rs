//! Pluggable JSON decoding into persistent, immutable collections.
//!
//! A [`Mapper`] reads JSON text into [`Value`]s whose arrays and objects are
//! structurally shared [`rpds`] collections: cloning a decoded document is
//! O(1) and the result can be handed to any thread.
//!
//! Decoding is driven by a [`DecoderRegistry`] that maps each
//! [`ExpectedType`] to a [`Decoder`]. Decoders pull tokens from a
//! [`TokenCursor`] and resolve the decoders for nested values through a
//! per-call [`DecodeContext`], which caches every resolution. Replacing a
//! registry entry changes how that type is decoded everywhere it appears.
//!
//! On top of that, a mapper can
//! - map field names through a key function, e.g. into [`Keyword`]s,
//! - read `[tag, payload]` arrays as keywords or as application values,
//! - read the string `"null"` as `null`.
//!
//! ```
//! use persistent_json::{Key, Keyword, Mapper, Value};
//!
//! let mapper = Mapper::builder().keyword_keys().keyword_tag("!kw").build();
//! let v = mapper.read_str(r#"{"state": ["!kw", "ready"]}"#).unwrap();
//! assert_eq!(
//!     v.get(&Key::keyword("state")),
//!     Some(&Value::Keyword(Keyword::intern("ready")))
//! );
//! assert_eq!(mapper.write_string(&v).unwrap(), r#"{"state":["!kw","ready"]}"#);
//! ```

mod builder;
mod decode;
mod encode;
mod error;
mod key;
mod lexer;
mod mapper;
#[cfg(any(test, feature = "serde"))]
mod serde_impl;
mod token;
pub mod transform;
mod value;

#[cfg(test)]
mod tests;

pub use builder::{ArrayBuilder, MapBuilder};
pub use decode::{
    AnyValueDecoder, DEFAULT_MAX_DEPTH, DecodeContext, Decoder, DecoderRegistry, ExpectedType,
    FnKeyDecoder, KeyDecoder, KeywordKeys, MappingDecoder, NULL_SENTINEL, RegistryBuilder,
    SequenceDecoder, StringDecoder, StringKeys, TagDispatch, TagTable, TaggedSequenceDecoder,
};
pub use encode::Encoder;
pub use error::{
    ConfigurationError, CursorError, DecodeError, EncodeError, Result, SyntaxError,
    TransformError,
};
pub use key::{Key, Keyword};
pub use lexer::StrCursor;
pub use mapper::{Mapper, MapperBuilder};
pub use token::{JsonToken, Position, TokenCursor, TokenTape};
pub use value::{Array, Ext, Extension, Map, Tagged, Value};
