use std::{collections::HashMap, sync::Arc};

use super::{
    AnyValueDecoder, DecodeContext, Decoder, ExpectedType, KeyDecoder, MappingDecoder,
    SequenceDecoder, StringDecoder, StringKeys,
};
use crate::error::ConfigurationError;

/// Default limit on nested arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Immutable table of decoders by expected type, plus the key decoder.
///
/// Built once with a [`RegistryBuilder`] and then shared: lookups take
/// `&self` and hand out clones of the registered `Arc`s, so resolving the
/// same type twice yields the very same decoder.
#[derive(Debug, Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<ExpectedType, Arc<dyn Decoder>>,
    key_decoder: Arc<dyn KeyDecoder>,
    max_depth: usize,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        RegistryBuilder::standard().build()
    }
}

impl DecoderRegistry {
    /// A builder preloaded with the standard decoders.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::standard()
    }

    /// Looks up the decoder registered for `expected`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if nothing is registered for the type.
    pub fn find(&self, expected: &ExpectedType) -> Result<Arc<dyn Decoder>, ConfigurationError> {
        match self.decoders.get(expected) {
            Some(decoder) => Ok(Arc::clone(decoder)),
            None => {
                tracing::debug!(%expected, "no decoder registered");
                Err(ConfigurationError {
                    expected: expected.clone(),
                })
            }
        }
    }

    /// The decoder applied to object field names.
    #[must_use]
    pub fn key_decoder(&self) -> Arc<dyn KeyDecoder> {
        Arc::clone(&self.key_decoder)
    }

    /// Maximum nesting of arrays and objects.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Starts a fresh context for one top-level decode.
    #[must_use]
    pub fn context(&self) -> DecodeContext<'_> {
        DecodeContext::new(self)
    }
}

/// Assembles a [`DecoderRegistry`].
///
/// ```
/// use std::sync::Arc;
/// use persistent_json::{DecoderRegistry, ExpectedType, StringDecoder};
///
/// let registry = DecoderRegistry::builder()
///     .decoder(ExpectedType::String, Arc::new(StringDecoder::with_null_sentinel()))
///     .max_depth(16)
///     .build();
/// assert_eq!(registry.max_depth(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    decoders: HashMap<ExpectedType, Arc<dyn Decoder>>,
    key_decoder: Arc<dyn KeyDecoder>,
    max_depth: usize,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::standard()
    }
}

impl RegistryBuilder {
    /// A builder with no decoders and string keys.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
            key_decoder: Arc::new(StringKeys),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// A builder with decoders for any value, strings, arrays and objects.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .decoder(ExpectedType::Any, Arc::new(AnyValueDecoder))
            .decoder(ExpectedType::String, Arc::new(StringDecoder::verbatim()))
            .decoder(ExpectedType::Array, Arc::new(SequenceDecoder::new()))
            .decoder(ExpectedType::Object, Arc::new(MappingDecoder))
    }

    /// Registers `decoder` for `expected`, replacing any earlier one.
    #[must_use]
    pub fn decoder(mut self, expected: ExpectedType, decoder: Arc<dyn Decoder>) -> Self {
        self.decoders.insert(expected, decoder);
        self
    }

    /// Removes whatever is registered for `expected`.
    #[must_use]
    pub fn without(mut self, expected: &ExpectedType) -> Self {
        self.decoders.remove(expected);
        self
    }

    /// Sets the decoder for object field names.
    #[must_use]
    pub fn key_decoder(mut self, keys: Arc<dyn KeyDecoder>) -> Self {
        self.key_decoder = keys;
        self
    }

    /// Sets the nesting limit.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Freezes the configuration.
    #[must_use]
    pub fn build(self) -> DecoderRegistry {
        DecoderRegistry {
            decoders: self.decoders,
            key_decoder: self.key_decoder,
            max_depth: self.max_depth,
        }
    }
}
