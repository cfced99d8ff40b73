//! rpc9k core: the wire message model shared by clients, servers, and stubs.
//!
//! This crate defines the tagged-union [`Envelope`](protocol::Envelope), the
//! closed set of message kinds, the kind registry used at decode time, and the
//! transport-agnostic [`Request`](protocol::Request). It intentionally carries
//! no transport or runtime dependencies so it can be reused in multiple
//! contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed or newer-than-client wire data surfaces as `Rpc9kError` so the
//! caller can inspect it instead of the process aborting.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, Result, Rpc9kError};
pub use protocol::{Action, Envelope, Kind, KindRegistry, Message, Request};
