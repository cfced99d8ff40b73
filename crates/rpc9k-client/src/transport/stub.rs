//! Deterministic in-process transport.
//!
//! Serves fixed envelopes for `get` routes and echoes request bodies for
//! `post` routes. Every request is counted and logged so tests can assert
//! exactly how often the network would have been hit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;

use rpc9k_core::error::{Result, Rpc9kError};
use rpc9k_core::protocol::{
    Action, Envelope, Json, Namespace, Procedure, Redirect, Request, Service,
    CONTENT_TYPE_ENVELOPE,
};

use crate::options::{Auth, Options};
use crate::transport::Transport;

#[derive(Debug, Clone)]
enum Route {
    Serve(Envelope),
    Echo,
}

/// One request as the stub saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub action: Action,
    pub url: String,
    /// Name from the [`Auth`] options, when present.
    pub auth: Option<String>,
}

#[derive(Default)]
pub struct StubServer {
    routes: DashMap<(Action, String), Route>,
    calls: AtomicUsize,
    log: Mutex<Vec<Served>>,
}

impl StubServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference tree:
    ///
    /// - `GET /` Namespace `["Example"]`
    /// - `GET /Example` Redirect to `/Example/`
    /// - `GET /Example/` Service `["rpc"]`
    /// - `GET /Example/rpc` Procedure `["x", "y"]`
    /// - `POST /Example/rpc` echoes its arguments
    pub fn example() -> Self {
        let stub = Self::new();
        stub.serve("/", Namespace::new(["Example"]).into());
        stub.serve("/Example", Redirect::new("/Example/").into());
        stub.serve("/Example/", Service::new(["rpc"]).into());
        stub.serve("/Example/rpc", Procedure::new(["x", "y"]).into());
        stub.echo("/Example/rpc");
        stub
    }

    /// Answer `get url` with `env`.
    pub fn serve(&self, url: impl Into<String>, env: Envelope) {
        self.routes.insert((Action::Get, url.into()), Route::Serve(env));
    }

    /// Answer `post url` with `env`, ignoring the body.
    pub fn serve_post(&self, url: impl Into<String>, env: Envelope) {
        self.routes.insert((Action::Post, url.into()), Route::Serve(env));
    }

    /// Answer `post url` with its own body.
    pub fn echo(&self, url: impl Into<String>) {
        self.routes.insert((Action::Post, url.into()), Route::Echo);
    }

    /// Number of requests served (including failed ones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn served(&self) -> Vec<Served> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn record(&self, served: Served) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut log) = self.log.lock() {
            log.push(served);
        }
    }

    fn echo_body(req: &Request) -> Result<Envelope> {
        let Some(body) = req.body()? else {
            return Ok(Envelope::empty());
        };
        if body.content_type == CONTENT_TYPE_ENVELOPE {
            return Envelope::decode(&body.value);
        }
        if body.is_json() {
            return Json::from_slice(&body.value).map(Into::into);
        }
        Ok(body.into())
    }
}

impl Transport for StubServer {
    fn send(&self, url: &str, req: &Request, options: &Options) -> Result<Envelope> {
        tracing::debug!(action = %req.action, %url, "stub serving");
        self.record(Served {
            action: req.action,
            url: url.to_string(),
            auth: options.get::<Auth>().map(|a| a.name.clone()),
        });

        let route = self
            .routes
            .get(&(req.action, url.to_string()))
            .map(|r| r.value().clone())
            .ok_or_else(|| Rpc9kError::Transport(format!("no route: {} {url}", req.action)))?;

        match route {
            Route::Serve(env) => Ok(env),
            Route::Echo => Self::echo_body(req),
        }
    }
}
