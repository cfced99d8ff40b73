//! Wire protocol: envelope, message kinds, kind registry, and requests.
//!
//! - `envelope`: the tagged-union value and its JSON codec.
//! - `kind`: kind tags and the decode-time registry.
//! - `message`: the closed set of message kinds and their capabilities.
//! - `request`: what a client asks a transport to do.
//!
//! Decoding never panics: unknown tags and malformed payloads are reported as
//! `Rpc9kError` so the caller can inspect them.

pub mod envelope;
pub mod kind;
pub mod message;
pub mod request;
pub mod url;

pub use envelope::{Envelope, CONTENT_TYPE_ENVELOPE, CONTENT_TYPE_JSON};
pub use kind::{FromWire, Kind, KindRegistry, MessageBuilder};
pub use message::{
    Blob, ErrorMessage, Json, Message, Namespace, Procedure, Redirect, Service, Value, WireMessage,
};
pub use request::{Action, Request};
pub use url::join_url;
