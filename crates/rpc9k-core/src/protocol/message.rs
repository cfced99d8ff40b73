//! Message kinds and their shared capability set.
//!
//! Every kind answers the same four questions: which routes it exposes, what
//! request fetches a named child, what request invokes it, and how its payload
//! is scanned into a caller's type. Kinds that cannot answer return a typed
//! error rather than `None`, so callers never special-case absence.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::error::{Result, Rpc9kError};

use super::envelope::Envelope;
use super::kind::{FromWire, Kind, KindRegistry};
use super::request::Request;
use super::url::join_url;

/// Capability set shared by every message kind.
pub trait WireMessage {
    fn kind(&self) -> Kind;

    /// Ordered names of the children this message links to.
    fn routes(&self) -> &[String] {
        &[]
    }

    /// Request that retrieves the child called `name`.
    fn fetch(&self, name: &str, _base: &str) -> Result<Request> {
        Err(Rpc9kError::NotFetchable {
            kind: self.kind(),
            name: name.to_string(),
        })
    }

    /// Request that invokes this message with `args`.
    fn call(&self, _args: Envelope, _base: &str) -> Result<Request> {
        Err(Rpc9kError::NotCallable(self.kind()))
    }

    /// Coerce the payload into `T`.
    fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        Err(Rpc9kError::NotScannable(self.kind()))
    }
}

/// Directory of named sub-resources.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Namespace {
    pub names: Vec<String>,
    /// Relative URL overrides, by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub urls: BTreeMap<String, String>,
    /// Children shipped inline, by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub embeds: BTreeMap<String, Envelope>,
}

impl Namespace {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.urls.insert(name.into(), url.into());
        self
    }

    pub fn with_embed(mut self, name: impl Into<String>, env: Envelope) -> Self {
        self.embeds.insert(name.into(), env);
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NamespaceWire {
    #[serde(default, deserialize_with = "nullable")]
    names: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    urls: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    embeds: BTreeMap<String, Box<RawValue>>,
}

impl FromWire for Namespace {
    fn from_wire(registry: &KindRegistry, raw: &str) -> Result<Self> {
        let wire: NamespaceWire = parse(raw)?;
        Ok(Self {
            names: wire.names,
            urls: wire.urls,
            embeds: decode_embeds(registry, wire.embeds)?,
        })
    }
}

impl WireMessage for Namespace {
    fn kind(&self) -> Kind {
        Kind::Namespace
    }

    fn routes(&self) -> &[String] {
        &self.names
    }

    fn fetch(&self, name: &str, base: &str) -> Result<Request> {
        let links = Links {
            kind: Kind::Namespace,
            routes: &self.names,
            urls: &self.urls,
            embeds: &self.embeds,
        };
        links.fetch(name, base, &BTreeMap::new())
    }
}

/// API surface whose children are methods.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service {
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub urls: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub embeds: BTreeMap<String, Envelope>,
    /// Forwarded on every fetch through this service.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl Service {
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.urls.insert(name.into(), url.into());
        self
    }

    pub fn with_embed(mut self, name: impl Into<String>, env: Envelope) -> Self {
        self.embeds.insert(name.into(), env);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceWire {
    #[serde(default, deserialize_with = "nullable")]
    methods: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    urls: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    embeds: BTreeMap<String, Box<RawValue>>,
    #[serde(default, deserialize_with = "nullable")]
    params: BTreeMap<String, String>,
}

impl FromWire for Service {
    fn from_wire(registry: &KindRegistry, raw: &str) -> Result<Self> {
        let wire: ServiceWire = parse(raw)?;
        Ok(Self {
            methods: wire.methods,
            urls: wire.urls,
            embeds: decode_embeds(registry, wire.embeds)?,
            params: wire.params,
        })
    }
}

impl WireMessage for Service {
    fn kind(&self) -> Kind {
        Kind::Service
    }

    fn routes(&self) -> &[String] {
        &self.methods
    }

    fn fetch(&self, name: &str, base: &str) -> Result<Request> {
        let links = Links {
            kind: Kind::Service,
            routes: &self.methods,
            urls: &self.urls,
            embeds: &self.embeds,
        };
        links.fetch(name, base, &self.params)
    }
}

// Namespace and Service resolve children identically.
struct Links<'a> {
    kind: Kind,
    routes: &'a [String],
    urls: &'a BTreeMap<String, String>,
    embeds: &'a BTreeMap<String, Envelope>,
}

impl Links<'_> {
    fn fetch(&self, name: &str, base: &str, params: &BTreeMap<String, String>) -> Result<Request> {
        let declared = self.routes.iter().any(|r| r == name)
            || self.urls.contains_key(name)
            || self.embeds.contains_key(name);
        if !declared {
            return Err(Rpc9kError::NoSuchRoute {
                kind: self.kind,
                name: name.to_string(),
            });
        }

        let relative = self.urls.get(name).map(String::as_str).unwrap_or(name);
        let mut req = Request::get(base)
            .with_relative(relative)
            .with_params(params.clone());
        if let Some(env) = self.embeds.get(name) {
            req = req.with_cached(env.clone());
        }
        Ok(req)
    }
}

/// Callable endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Procedure {
    /// Declared argument names. Informational only; not validated.
    pub arguments: Vec<String>,
    /// Defaults for call parameters; the caller's own take precedence.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    /// Fixed reply, served without a round trip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<Envelope>>,
}

impl Procedure {
    pub fn new<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_result(mut self, result: Envelope) -> Self {
        self.result = Some(Box::new(result));
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProcedureWire {
    #[serde(default, deserialize_with = "nullable")]
    arguments: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    params: BTreeMap<String, String>,
    #[serde(default)]
    result: Option<Box<RawValue>>,
}

impl FromWire for Procedure {
    fn from_wire(registry: &KindRegistry, raw: &str) -> Result<Self> {
        let wire: ProcedureWire = parse(raw)?;
        let result = match wire.result {
            Some(raw) => Some(Box::new(Envelope::decode_with(registry, raw.get())?)),
            None => None,
        };
        Ok(Self {
            arguments: wire.arguments,
            params: wire.params,
            result,
        })
    }
}

impl WireMessage for Procedure {
    fn kind(&self) -> Kind {
        Kind::Procedure
    }

    fn call(&self, args: Envelope, base: &str) -> Result<Request> {
        let mut req = Request::post(base)
            .with_params(self.params.clone())
            .with_args(args);
        if let Some(result) = &self.result {
            req = req.with_cached((**result).clone());
        }
        Ok(req)
    }
}

/// Undecoded JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Json {
    pub value: Box<RawValue>,
}

impl Json {
    /// Wrap raw JSON bytes, checking they parse.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| Rpc9kError::Malformed(e.to_string()))?;
        let value = RawValue::from_string(text.to_owned())
            .map_err(|e| Rpc9kError::Malformed(e.to_string()))?;
        Ok(Self { value })
    }

    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::value::to_raw_value(value)
            .map_err(|e| Rpc9kError::Encode(e.to_string()))?;
        Ok(Self { value })
    }

    pub fn as_str(&self) -> &str {
        self.value.get()
    }
}

// Semantic comparison: whitespace in the raw text does not matter.
impl PartialEq for Json {
    fn eq(&self, other: &Self) -> bool {
        let a = serde_json::from_str::<serde_json::Value>(self.value.get());
        let b = serde_json::from_str::<serde_json::Value>(other.value.get());
        match (a, b) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.value.get() == other.value.get(),
        }
    }
}

impl WireMessage for Json {
    fn kind(&self) -> Kind {
        Kind::Json
    }

    fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(self.value.get()).map_err(|e| Rpc9kError::Scan(e.to_string()))
    }
}

/// Already-decoded generic value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Value {
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Value {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value).map_err(|e| Rpc9kError::Encode(e.to_string()))?;
        Ok(Self { value })
    }
}

impl WireMessage for Value {
    fn kind(&self) -> Kind {
        Kind::Value
    }

    fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.value).map_err(|e| Rpc9kError::Scan(e.to_string()))
    }
}

/// Opaque bytes with a content type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Blob {
    #[serde(default)]
    pub content_type: String,
    #[serde(default, with = "base64_bytes")]
    pub value: Bytes,
}

impl Blob {
    pub fn new(content_type: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            value: value.into(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.value
    }

    /// True when the content type names JSON (including `+json` suffixes).
    pub fn is_json(&self) -> bool {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        essence == "application/json" || essence.ends_with("+json")
    }
}

impl WireMessage for Blob {
    fn kind(&self) -> Kind {
        Kind::Blob
    }

    /// Scans the raw bytes as a byte sequence (e.g. into `Vec<u8>`).
    fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = serde_json::Value::from(self.value.to_vec());
        T::deserialize(&bytes).map_err(|e| Rpc9kError::Scan(e.to_string()))
    }
}

/// Pointer to another location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Redirect {
    pub target: String,
}

impl Redirect {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Location to follow, given the URL that produced this redirect.
    pub fn url(&self, current: &str) -> String {
        join_url(current, &self.target)
    }
}

impl WireMessage for Redirect {
    fn kind(&self) -> Kind {
        Kind::Redirect
    }
}

/// Failure reported by the remote side (or built locally from an error).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
}

impl ErrorMessage {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn to_error(&self) -> Rpc9kError {
        Rpc9kError::Remote {
            id: self.id.clone(),
            text: self.text.clone(),
        }
    }
}

impl WireMessage for ErrorMessage {
    fn kind(&self) -> Kind {
        Kind::Error
    }

    fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        Err(self.to_error())
    }
}

/// Closed sum of every message kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Namespace(Namespace),
    Service(Service),
    Procedure(Procedure),
    Json(Json),
    Value(Value),
    Blob(Blob),
    Redirect(Redirect),
    Error(ErrorMessage),
    Empty,
}

impl Message {
    /// Lift into an envelope tagged with this message's kind.
    pub fn wrap(self) -> Envelope {
        Envelope::from(self)
    }
}

impl WireMessage for Message {
    fn kind(&self) -> Kind {
        match self {
            Message::Namespace(m) => m.kind(),
            Message::Service(m) => m.kind(),
            Message::Procedure(m) => m.kind(),
            Message::Json(m) => m.kind(),
            Message::Value(m) => m.kind(),
            Message::Blob(m) => m.kind(),
            Message::Redirect(m) => m.kind(),
            Message::Error(m) => m.kind(),
            Message::Empty => Kind::Empty,
        }
    }

    fn routes(&self) -> &[String] {
        match self {
            Message::Namespace(m) => m.routes(),
            Message::Service(m) => m.routes(),
            _ => &[],
        }
    }

    fn fetch(&self, name: &str, base: &str) -> Result<Request> {
        match self {
            Message::Namespace(m) => m.fetch(name, base),
            Message::Service(m) => m.fetch(name, base),
            other => Err(Rpc9kError::NotFetchable {
                kind: other.kind(),
                name: name.to_string(),
            }),
        }
    }

    fn call(&self, args: Envelope, base: &str) -> Result<Request> {
        match self {
            Message::Procedure(m) => m.call(args, base),
            other => Err(Rpc9kError::NotCallable(other.kind())),
        }
    }

    fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Message::Json(m) => m.scan(),
            Message::Value(m) => m.scan(),
            Message::Blob(m) => m.scan(),
            Message::Error(m) => m.scan(),
            Message::Empty => Err(Rpc9kError::NothingToScan),
            other => Err(Rpc9kError::NotScannable(other.kind())),
        }
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Message {
                fn from(m: $ty) -> Self {
                    Message::$variant(m)
                }
            }

            impl From<$ty> for Envelope {
                fn from(m: $ty) -> Self {
                    Envelope::from(Message::$variant(m))
                }
            }
        )*
    };
}

impl_from_kind! {
    Namespace => Namespace,
    Service => Service,
    Procedure => Procedure,
    Json => Json,
    Value => Value,
    Blob => Blob,
    Redirect => Redirect,
    Error => ErrorMessage,
}

// Leaf kinds carry no nested envelopes; serde does all the work.
macro_rules! impl_from_wire_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromWire for $ty {
                fn from_wire(_registry: &KindRegistry, raw: &str) -> Result<Self> {
                    parse(raw)
                }
            }
        )*
    };
}

impl_from_wire_serde!(Json, Value, Blob, Redirect, ErrorMessage);

fn parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Rpc9kError::Malformed(e.to_string()))
}

fn decode_embeds(
    registry: &KindRegistry,
    raw: BTreeMap<String, Box<RawValue>>,
) -> Result<BTreeMap<String, Envelope>> {
    raw.into_iter()
        .map(|(name, env)| Envelope::decode_with(registry, env.get()).map(|env| (name, env)))
        .collect()
}

// Peers that emit `null` for an empty list or map decode to the default.
fn nullable<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Bytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
        let encoded = Option::<String>::deserialize(d)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(de::Error::custom)
    }
}
