//! Kind tags and the registry that turns them back into messages.
//!
//! Decoding is two-phase: read only the `Kind` field, then hand the full
//! document to the builder registered for that tag. An unregistered tag is a
//! recoverable [`Rpc9kError::UnknownKind`], never a default. Kinds that carry
//! nested envelopes decode them with the same registry, so aliases and the
//! unknown-kind error apply at every depth.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{Result, Rpc9kError};

use super::message::{
    Blob, ErrorMessage, Json, Message, Namespace, Procedure, Redirect, Service, Value,
};

/// Discriminator of a wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    Namespace,
    Service,
    Procedure,
    Json,
    Value,
    Blob,
    Redirect,
    Error,
    #[default]
    Empty,
}

impl Kind {
    /// Every built-in kind, in registry order.
    pub const ALL: [Kind; 9] = [
        Kind::Namespace,
        Kind::Service,
        Kind::Procedure,
        Kind::Json,
        Kind::Value,
        Kind::Blob,
        Kind::Redirect,
        Kind::Error,
        Kind::Empty,
    ];

    /// Tag written to the `Kind` field on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Namespace => "Namespace",
            Kind::Service => "Service",
            Kind::Procedure => "Procedure",
            Kind::Json => "JSON",
            Kind::Value => "Value",
            Kind::Blob => "Blob",
            Kind::Redirect => "Redirect",
            Kind::Error => "Error",
            Kind::Empty => "Empty",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Rpc9kError;

    fn from_str(s: &str) -> Result<Self> {
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Rpc9kError::UnknownKind(s.to_string()))
    }
}

/// Builds a message from the complete JSON document it was tagged in.
pub type MessageBuilder = fn(&KindRegistry, &str) -> Result<Message>;

/// A message kind decodable from its tagged JSON document.
pub trait FromWire: Sized {
    /// Decode `raw`; nested envelopes are decoded through `registry`.
    fn from_wire(registry: &KindRegistry, raw: &str) -> Result<Self>;
}

/// Mapping from kind tag to message builder.
///
/// [`KindRegistry::builtin`] holds every built-in kind and is what
/// [`Envelope`](super::Envelope) decoding uses by default. Additional tags
/// (aliases from older servers, for instance) can be registered on an owned
/// registry and passed to [`Envelope::decode_with`](super::Envelope::decode_with).
#[derive(Debug, Clone)]
pub struct KindRegistry {
    builders: HashMap<String, MessageBuilder>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut reg = Self {
            builders: HashMap::new(),
        };
        reg.register(Kind::Namespace.as_str(), build::<Namespace>);
        reg.register(Kind::Service.as_str(), build::<Service>);
        reg.register(Kind::Procedure.as_str(), build::<Procedure>);
        reg.register(Kind::Json.as_str(), build::<Json>);
        reg.register(Kind::Value.as_str(), build::<Value>);
        reg.register(Kind::Blob.as_str(), build::<Blob>);
        reg.register(Kind::Redirect.as_str(), build::<Redirect>);
        reg.register(Kind::Error.as_str(), build::<ErrorMessage>);
        reg.register(Kind::Empty.as_str(), build_empty);
        reg
    }
}

impl KindRegistry {
    /// Registry with the built-in kinds only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry of built-in kinds.
    pub fn builtin() -> &'static KindRegistry {
        static BUILTIN: OnceLock<KindRegistry> = OnceLock::new();
        BUILTIN.get_or_init(KindRegistry::default)
    }

    /// Register (or replace) the builder for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, builder: MessageBuilder) {
        self.builders.insert(tag.into(), builder);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.builders.contains_key(tag)
    }

    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Look up the builder for `tag`.
    pub fn lookup(&self, tag: &str) -> Result<MessageBuilder> {
        self.builders
            .get(tag)
            .copied()
            .ok_or_else(|| Rpc9kError::UnknownKind(tag.to_string()))
    }
}

/// Decode `raw` as `T` and lift it into a [`Message`].
pub fn build<T>(registry: &KindRegistry, raw: &str) -> Result<Message>
where
    T: FromWire + Into<Message>,
{
    T::from_wire(registry, raw).map(Into::into)
}

fn build_empty(_registry: &KindRegistry, _raw: &str) -> Result<Message> {
    Ok(Message::Empty)
}

/// First decode phase: the tag and nothing else.
#[derive(Debug, Deserialize)]
pub(crate) struct KindProbe {
    #[serde(rename = "Kind")]
    pub kind: String,
}
