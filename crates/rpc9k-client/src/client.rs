//! Client: one step in a walk over the resource graph.
//!
//! A client is a value: `url` + `envelope`, or a terminal error. Every
//! operation returns a new client. Internals are written against `Result`;
//! the public methods fold the first error into a failed client, after which
//! every further operation is a no-op returning that same client.
//!
//! Clients whose envelope came from an embed or a canned result skip the path
//! cache: they can share a URL with a transport-backed client while holding a
//! different message, and the cache is keyed by URL.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use rpc9k_core::error::{Result, Rpc9kError};
use rpc9k_core::protocol::{Blob, Envelope, Message, Request};

use crate::cache::{PathCache, Resolved};
use crate::options::Options;
use crate::session::{Connector, Session};
use crate::transport::Transport;

/// Separator between names in a fetch path (`"Example:rpc"`).
pub const PATH_SEPARATOR: char = ':';

#[derive(Clone)]
pub struct Client {
    url: String,
    envelope: Envelope,
    err: Option<Rpc9kError>,
    embedded: bool,
    session: Arc<Session>,
}

impl Client {
    /// GET `root_url` through `transport` and wrap the reply.
    pub fn dial(root_url: &str, options: Options, transport: Arc<dyn Transport>) -> Client {
        Connector::new(transport).options(options).dial(root_url)
    }

    /// Wrap a known envelope; no request is made.
    pub fn new(
        url: impl Into<String>,
        envelope: Envelope,
        options: Options,
        transport: Arc<dyn Transport>,
    ) -> Client {
        Connector::new(transport).options(options).open(url, envelope)
    }

    pub(crate) fn from_parts(session: Arc<Session>, url: String, envelope: Envelope) -> Client {
        Client {
            url,
            envelope,
            err: None,
            embedded: false,
            session,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn err(&self) -> Option<&Rpc9kError> {
        self.err.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }

    pub fn options(&self) -> &Options {
        &self.session.options
    }

    pub fn routes(&self) -> &[String] {
        self.envelope.routes()
    }

    /// Path cache shared by every client descended from the same root.
    pub fn cache(&self) -> &PathCache {
        &self.session.cache
    }

    pub fn into_result(self) -> Result<Client> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Resolve a colon-separated path of names, one fetch per segment.
    pub fn fetch(&self, path: &str) -> Client {
        self.chain(|c| c.try_fetch(path))
    }

    /// Invoke the current message with `args` wrapped as a Value.
    pub fn call<A: Serialize + ?Sized>(&self, args: &A) -> Client {
        self.chain(|c| {
            let args = Envelope::value(args)?;
            c.try_call(args)
        })
    }

    /// Invoke with caller parameters layered over the procedure's defaults.
    pub fn call_with_params<A: Serialize + ?Sized>(
        &self,
        args: &A,
        params: BTreeMap<String, String>,
    ) -> Client {
        self.chain(|c| {
            let args = Envelope::value(args)?;
            c.try_call_with(args, params)
        })
    }

    /// Invoke the current message with a prepared envelope as arguments.
    pub fn call_envelope(&self, args: Envelope) -> Client {
        self.chain(|c| c.try_call(args))
    }

    /// `fetch(path)` then `call(args)`.
    pub fn invoke<A: Serialize + ?Sized>(&self, path: &str, args: &A) -> Client {
        self.fetch(path).call(args)
    }

    pub fn invoke_envelope(&self, path: &str, args: Envelope) -> Client {
        self.fetch(path).call_envelope(args)
    }

    /// Resolve a single request against this client.
    pub fn request(&self, req: &Request) -> Client {
        self.chain(|c| c.try_request(req))
    }

    /// Scan the current payload into `out`.
    pub fn scan<T: DeserializeOwned>(&self, out: &mut T) -> Client {
        self.scan_opt(Some(out))
    }

    /// Scan with an optional target.
    ///
    /// Empty envelope and no target is a no-op; exactly one of the two being
    /// absent is an error.
    pub fn scan_opt<T: DeserializeOwned>(&self, out: Option<&mut T>) -> Client {
        if self.err.is_some() {
            return self.clone();
        }
        match (self.envelope.is_empty(), out) {
            (true, None) => self.clone(),
            (true, Some(_)) => self.failed(Rpc9kError::NothingToScan),
            (false, None) => self.failed(Rpc9kError::NoScanTarget(self.envelope.kind())),
            (false, Some(out)) => match self.envelope.scan::<T>() {
                Ok(value) => {
                    *out = value;
                    self.clone()
                }
                Err(err) => self.failed(err),
            },
        }
    }

    /// Current payload as a blob; `None` when empty.
    pub fn blob(&self) -> Result<Option<Blob>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        self.envelope.blob()
    }

    fn chain(&self, op: impl FnOnce(&Client) -> Result<Client>) -> Client {
        if self.err.is_some() {
            return self.clone();
        }
        op(self).unwrap_or_else(|err| self.failed(err))
    }

    fn failed(&self, err: Rpc9kError) -> Client {
        tracing::debug!(url = %self.url, code = err.code().as_str(), error = %err, "client failed");
        Client {
            url: self.url.clone(),
            envelope: Envelope::from(&err),
            err: Some(err),
            embedded: self.embedded,
            session: Arc::clone(&self.session),
        }
    }

    fn next(&self, url: String, envelope: Envelope) -> Client {
        Client::from_parts(Arc::clone(&self.session), url, envelope)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.envelope.is_empty() || self.url.is_empty() {
            return Err(Rpc9kError::NotOpen);
        }
        Ok(())
    }

    fn try_fetch(&self, path: &str) -> Result<Client> {
        self.ensure_open()?;
        let _span = tracing::debug_span!("fetch", origin = %self.url, path).entered();

        let cache = (!self.embedded).then_some(&self.session.cache);
        if let Some(hit) = cache.and_then(|c| c.get(&self.url, path)) {
            tracing::debug!(url = %hit.url, "cache hit");
            return Ok(self.next(hit.url, hit.envelope));
        }

        let mut prefix = String::new();
        let mut current = self.clone();
        for segment in path.split(PATH_SEPARATOR) {
            let parent = prefix.clone();
            if !prefix.is_empty() {
                prefix.push(PATH_SEPARATOR);
            }
            prefix.push_str(segment);

            if let Some(hit) = cache.and_then(|c| c.get(&self.url, &prefix)) {
                current = self.next(hit.url, hit.envelope);
                continue;
            }

            let unresolved = |err: Rpc9kError| Rpc9kError::Unresolved {
                segment: segment.to_string(),
                prefix: parent.clone(),
                source: Box::new(err),
            };

            let req = current
                .envelope
                .fetch(segment, &current.url)
                .map_err(unresolved)?;
            current = current.try_request(&req).map_err(unresolved)?;

            if let (Some(cache), false) = (cache, current.embedded) {
                cache.insert(
                    &self.url,
                    &prefix,
                    Resolved {
                        url: current.url.clone(),
                        envelope: current.envelope.clone(),
                    },
                );
            }
        }
        Ok(current)
    }

    fn try_call(&self, args: Envelope) -> Result<Client> {
        self.try_call_with(args, BTreeMap::new())
    }

    fn try_call_with(&self, args: Envelope, params: BTreeMap<String, String>) -> Result<Client> {
        self.ensure_open()?;
        let req = self.envelope.call(args, &self.url)?.with_params(params);
        self.try_request(&req)
    }

    fn try_request(&self, req: &Request) -> Result<Client> {
        let mut url = req.url(&self.url);

        if let Some(cached) = &req.cached {
            tracing::debug!(%url, kind = %cached.kind(), "embedded reply");
            let mut next = self.next(url, cached.clone());
            next.embedded = true;
            return Ok(next);
        }

        let max_redirects = self.session.max_redirects;
        let mut hops = 0;
        loop {
            tracing::debug!(action = %req.action, %url, "send");
            let reply = self
                .session
                .transport
                .send(&url, req, &self.session.options)?;
            tracing::debug!(%url, kind = %reply.kind(), "reply");

            let target = match reply.message() {
                Some(Message::Redirect(r)) => Some(r.url(&url)),
                Some(Message::Error(e)) => return Err(e.to_error()),
                _ => None,
            };
            let Some(target) = target else {
                return Ok(self.next(url, reply));
            };

            if hops >= max_redirects {
                tracing::warn!(%url, hops, "redirect limit reached");
                return Err(Rpc9kError::RedirectLoop { url, hops });
            }
            hops += 1;
            tracing::debug!(from = %url, to = %target, "redirected");
            url = target;
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("kind", &self.envelope.kind())
            .field("err", &self.err)
            .finish()
    }
}
