//! rpc9k client library entry.
//!
//! This crate walks a server's resource graph: it asks the current message
//! kind for a request, hands it to a [`Transport`], follows redirects, and
//! wraps the reply as the next [`Client`] value. Errors are sticky: once a
//! client has failed, every chained operation returns it unchanged.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cache;
pub mod client;
pub mod config;
pub mod options;
pub mod session;
pub mod transport;

pub use client::Client;
pub use options::{Auth, Options};
pub use session::{Connector, DEFAULT_MAX_REDIRECTS};
pub use transport::{StubServer, Transport};
