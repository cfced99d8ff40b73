//! Transport boundary.
//!
//! The client never speaks a network protocol itself. It composes a URL,
//! hands the [`Request`] to a [`Transport`], and expects a decoded envelope
//! back. Deadlines, retries, and connection handling belong to the transport
//! and reach the client only as [`Rpc9kError::Transport`](rpc9k_core::Rpc9kError::Transport).

pub mod stub;

use rpc9k_core::error::Result;
use rpc9k_core::protocol::{Envelope, Request};

use crate::options::Options;

pub use stub::StubServer;

/// Sends one request and returns the reply envelope.
///
/// Implementations must be safe to share between clients and threads: one
/// transport backs every client descended from a root.
pub trait Transport: Send + Sync {
    fn send(&self, url: &str, req: &Request, options: &Options) -> Result<Envelope>;
}
