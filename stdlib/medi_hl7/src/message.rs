use crate::accessor::PathValue;
use crate::encoding::Encoding;
use crate::error::HL7Result;
use crate::header::{HeaderBuilder, HeaderDefaults};
use crate::hl7::HL7Message;
use crate::serialize::SerializeOptions;
use crate::store::MessageStore;

/// Explicit configuration for a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MessageConfig {
    /// Delimiters for messages created from scratch.
    pub encoding: Encoding,
    pub header_defaults: HeaderDefaults,
}

/// Owns a message store and hands out short-lived accessors, header builders
/// and serialization pipelines over it.
#[derive(Debug, Clone, Default)]
pub struct Message<S: MessageStore = HL7Message> {
    store: S,
    header_defaults: HeaderDefaults,
}

impl Message<HL7Message> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> HL7Result<Self> {
        Ok(Self::with_store(HL7Message::parse(text)?))
    }

    /// An empty message using the configured delimiters and header defaults.
    pub fn from_config(config: MessageConfig) -> Self {
        Self::with_config(HL7Message::with_encoding(config.encoding.clone()), config)
    }
}

impl<S: MessageStore> Message<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            header_defaults: HeaderDefaults::default(),
        }
    }

    /// Wrap `store`, keeping its own delimiters; only the header defaults of
    /// `config` apply.
    pub fn with_config(store: S, config: MessageConfig) -> Self {
        Self {
            store,
            header_defaults: config.header_defaults,
        }
    }

    pub fn path(&mut self, path: impl Into<String>) -> PathValue<'_, S> {
        PathValue::new(self, path.into())
    }

    pub fn header(&mut self) -> HeaderBuilder<'_, S> {
        HeaderBuilder::new(self)
    }

    pub fn serialize(&mut self) -> SerializeOptions<'_, S> {
        SerializeOptions::new(self)
    }

    pub fn encoding(&self) -> &Encoding {
        self.store.encoding()
    }

    pub fn header_defaults(&self) -> &HeaderDefaults {
        &self.header_defaults
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
