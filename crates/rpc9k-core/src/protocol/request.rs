//! Transport-agnostic description of one wire operation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::envelope::Envelope;
use super::message::Blob;
use super::url::join_url;

/// Verb of a request: read (`get`) or mutate/invoke (`post`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Get,
    Post,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Post => "post",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pending wire operation.
///
/// A request with a `cached` envelope never reaches a transport: resolving it
/// yields the cached envelope directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub action: Action,
    /// Overrides the caller's current URL when set.
    pub base: Option<String>,
    /// Joined onto the base; empty means "the base itself".
    pub relative: String,
    pub params: BTreeMap<String, String>,
    pub args: Option<Envelope>,
    pub cached: Option<Envelope>,
}

impl Request {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            base: None,
            relative: String::new(),
            params: BTreeMap::new(),
            args: None,
            cached: None,
        }
    }

    pub fn get(base: impl Into<String>) -> Self {
        Self::new(Action::Get).with_base(base)
    }

    pub fn post(base: impl Into<String>) -> Self {
        Self::new(Action::Post).with_base(base)
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.base = (!base.is_empty()).then_some(base);
        self
    }

    pub fn with_relative(mut self, relative: impl Into<String>) -> Self {
        self.relative = relative.into();
        self
    }

    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_args(mut self, args: Envelope) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_cached(mut self, cached: Envelope) -> Self {
        self.cached = Some(cached);
        self
    }

    /// Compose the target URL; `current` is used when no base is set.
    pub fn url(&self, current: &str) -> String {
        let base = self.base.as_deref().unwrap_or(current);
        join_url(base, &self.relative)
    }

    /// Body to send: the args rendered as a blob, if any.
    pub fn body(&self) -> Result<Option<Blob>> {
        match &self.args {
            Some(args) => args.blob(),
            None => Ok(None),
        }
    }
}
