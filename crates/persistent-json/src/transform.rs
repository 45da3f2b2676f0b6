//! Application-supplied hook functions.
//!
//! Hooks are plain shared closures. Decoders only rely on their signature
//! and on them being pure: a hook runs at most once per field, element or
//! tagged value, and its error is returned to the caller as is.

use std::sync::Arc;

use crate::{error::TransformError, key::Key, value::Value};

/// Maps a field name to a [`Key`].
pub type KeyFn = Arc<dyn Fn(&str) -> Result<Key, TransformError> + Send + Sync>;

/// Maps a [`Key`] back to field-name text.
pub type KeyEncodeFn = Arc<dyn Fn(&Key) -> Result<String, TransformError> + Send + Sync>;

/// Turns the decoded payload of a tagged array into the final value.
pub type TagFn = Arc<dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync>;

/// Transforms a decoded value.
pub type ValueFn = Arc<dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync>;

/// Lifts an infallible field-name mapping into a [`KeyFn`].
pub fn key_fn<F>(f: F) -> KeyFn
where
    F: Fn(&str) -> Key + Send + Sync + 'static,
{
    Arc::new(move |name: &str| -> Result<Key, TransformError> { Ok(f(name)) })
}

/// Lifts an infallible key mapping into a [`KeyEncodeFn`].
pub fn key_encode_fn<F>(f: F) -> KeyEncodeFn
where
    F: Fn(&Key) -> String + Send + Sync + 'static,
{
    Arc::new(move |key: &Key| -> Result<String, TransformError> { Ok(f(key)) })
}

/// Lifts an infallible value mapping into a [`TagFn`] or [`ValueFn`].
pub fn value_fn<F>(f: F) -> ValueFn
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Arc::new(move |value: Value| -> Result<Value, TransformError> { Ok(f(value)) })
}
