//! Shared state behind a chain of clients.
//!
//! Every `Dial`/`New` creates one [`Session`]; every client derived from that
//! root holds the same `Arc<Session>` and so the same transport, options, and
//! path cache.

use std::sync::Arc;

use rpc9k_core::protocol::{Envelope, Request};

use crate::cache::PathCache;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::options::Options;
use crate::transport::Transport;

/// Redirect hops followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 8;

pub(crate) struct Session {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) options: Options,
    pub(crate) max_redirects: usize,
    pub(crate) cache: PathCache,
}

/// Opens root clients, each with a fresh cache.
#[derive(Clone)]
pub struct Connector {
    transport: Arc<dyn Transport>,
    options: Options,
    max_redirects: usize,
}

impl Connector {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            options: Options::none(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Connector configured from a validated [`ClientConfig`].
    pub fn from_config(cfg: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let options = cfg.auth.clone().map(Options::from).unwrap_or_default();
        Self::new(transport)
            .options(options)
            .max_redirects(cfg.client.max_redirects)
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    fn session(&self) -> Arc<Session> {
        Arc::new(Session {
            transport: Arc::clone(&self.transport),
            options: self.options.clone(),
            max_redirects: self.max_redirects,
            cache: PathCache::new(),
        })
    }

    /// GET `root_url` and wrap the reply.
    pub fn dial(&self, root_url: &str) -> Client {
        tracing::debug!(url = %root_url, "dial");
        let seed = Client::from_parts(self.session(), String::new(), Envelope::empty());
        seed.request(&Request::get(root_url))
    }

    /// Wrap a known envelope without touching the transport.
    pub fn open(&self, url: impl Into<String>, envelope: Envelope) -> Client {
        Client::from_parts(self.session(), url.into(), envelope)
    }
}
