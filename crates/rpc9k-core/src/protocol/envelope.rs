//! Envelope: the tagged-union wire value.
//!
//! On the wire an envelope is a single JSON object whose `Kind` field names
//! the message kind and whose remaining fields belong to that kind. Decoding
//! reads the tag first and dispatches through a [`KindRegistry`].

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{Result, Rpc9kError};

use super::kind::{Kind, KindProbe, KindRegistry};
use super::message::{Blob, ErrorMessage, Message, Value, WireMessage};
use super::request::Request;

/// Content type of plain JSON bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Content type of an encoded envelope.
pub const CONTENT_TYPE_ENVELOPE: &str = "application/9k+json";

/// A message together with its kind tag.
///
/// `Envelope::default()` is the empty envelope; it encodes as
/// `{"Kind":"Empty"}`, never as `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    kind: Kind,
    msg: Option<Message>,
}

impl Envelope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Error envelope with the given id and text.
    pub fn error(id: impl Into<String>, text: impl Into<String>) -> Self {
        ErrorMessage::new(id, text).into()
    }

    /// Wrap any serializable value as a `Value` envelope.
    pub fn value<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Value::encode(value).map(Into::into)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn message(&self) -> Option<&Message> {
        self.msg.as_ref()
    }

    pub fn into_message(self) -> Option<Message> {
        self.msg
    }

    pub fn is_empty(&self) -> bool {
        self.msg.is_none() || self.kind == Kind::Empty
    }

    pub fn routes(&self) -> &[String] {
        self.msg.as_ref().map(|m| m.routes()).unwrap_or(&[])
    }

    pub fn fetch(&self, name: &str, base: &str) -> Result<Request> {
        match &self.msg {
            Some(m) => m.fetch(name, base),
            None => Err(Rpc9kError::NotFetchable {
                kind: Kind::Empty,
                name: name.to_string(),
            }),
        }
    }

    pub fn call(&self, args: Envelope, base: &str) -> Result<Request> {
        match &self.msg {
            Some(m) => m.call(args, base),
            None => Err(Rpc9kError::NotCallable(Kind::Empty)),
        }
    }

    pub fn scan<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        match &self.msg {
            Some(m) => m.scan(),
            None => Err(Rpc9kError::NothingToScan),
        }
    }

    /// Render as a blob: what a transport puts in a request body.
    ///
    /// Blobs pass through, values and JSON become `application/json`, empty
    /// envelopes have no body, and every other kind is sent as an encoded
    /// envelope.
    pub fn blob(&self) -> Result<Option<Blob>> {
        let Some(msg) = &self.msg else {
            return Ok(None);
        };
        let blob = match msg {
            Message::Empty => return Ok(None),
            Message::Blob(b) => b.clone(),
            Message::Value(v) => {
                let bytes =
                    serde_json::to_vec(&v.value).map_err(|e| Rpc9kError::Encode(e.to_string()))?;
                Blob::new(CONTENT_TYPE_JSON, bytes)
            }
            Message::Json(j) => Blob::new(CONTENT_TYPE_JSON, j.as_str().as_bytes().to_vec()),
            _ => Blob::new(CONTENT_TYPE_ENVELOPE, self.encode()?),
        };
        Ok(Some(blob))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Rpc9kError::Encode(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Rpc9kError::Encode(e.to_string()))
    }

    /// Decode with the built-in registry.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let s = std::str::from_utf8(bytes).map_err(|e| Rpc9kError::Malformed(e.to_string()))?;
        Self::decode_str(s)
    }

    pub fn decode_str(s: &str) -> Result<Self> {
        Self::decode_with(KindRegistry::builtin(), s)
    }

    /// Decode the tag, look it up in `registry`, then decode the payload.
    pub fn decode_with(registry: &KindRegistry, s: &str) -> Result<Self> {
        let probe: KindProbe =
            serde_json::from_str(s).map_err(|e| Rpc9kError::Malformed(e.to_string()))?;
        let builder = registry.lookup(&probe.kind)?;
        builder(registry, s).map(Envelope::from)
    }
}

impl From<Message> for Envelope {
    fn from(msg: Message) -> Self {
        match msg {
            Message::Empty => Envelope::empty(),
            msg => Envelope {
                kind: msg.kind(),
                msg: Some(msg),
            },
        }
    }
}

impl From<&Rpc9kError> for Envelope {
    fn from(err: &Rpc9kError) -> Self {
        Envelope::error(err.id(), err.to_string())
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "Kind")]
    kind: &'static str,
    #[serde(flatten)]
    msg: &'a T,
}

#[derive(Serialize)]
struct Bare {}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let kind = self.kind.as_str();
        match &self.msg {
            None | Some(Message::Empty) => Tagged { kind, msg: &Bare {} }.serialize(s),
            Some(Message::Namespace(m)) => Tagged { kind, msg: m }.serialize(s),
            Some(Message::Service(m)) => Tagged { kind, msg: m }.serialize(s),
            Some(Message::Procedure(m)) => Tagged { kind, msg: m }.serialize(s),
            Some(Message::Json(m)) => Tagged { kind, msg: m }.serialize(s),
            Some(Message::Value(m)) => Tagged { kind, msg: m }.serialize(s),
            Some(Message::Blob(m)) => Tagged { kind, msg: m }.serialize(s),
            Some(Message::Redirect(m)) => Tagged { kind, msg: m }.serialize(s),
            Some(Message::Error(m)) => Tagged { kind, msg: m }.serialize(s),
        }
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(d)?;
        Envelope::decode_str(raw.get()).map_err(de::Error::custom)
    }
}

