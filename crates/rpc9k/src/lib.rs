//! Top-level facade crate for rpc9k.
//!
//! Re-exports the wire model and the client library so users can depend on a single crate.

pub mod core {
    pub use rpc9k_core::*;
}

pub mod client {
    pub use rpc9k_client::*;
}

pub use rpc9k_client::{Client, Connector, Options, Transport};
pub use rpc9k_core::{Envelope, Kind, Rpc9kError};
