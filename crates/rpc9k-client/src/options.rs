//! Opaque per-client options.
//!
//! The client never looks inside [`Options`]; it only hands them to the
//! transport with every request. A transport that understands a particular
//! payload (usually [`Auth`]) downcasts to it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// Credentials passed through to the transport.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Auth {
    pub name: String,
    pub token: String,
}

impl Auth {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Shared, type-erased options value.
#[derive(Clone, Default)]
pub struct Options {
    inner: Option<Arc<dyn Any + Send + Sync>>,
}

impl Options {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Some(Arc::new(value)),
        }
    }

    pub fn is_none(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the payload if it is a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.inner.as_deref().and_then(|v| v.downcast_ref::<T>())
    }
}

impl From<Auth> for Options {
    fn from(auth: Auth) -> Self {
        Options::new(auth)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get::<Auth>() {
            Some(auth) => f.debug_tuple("Options").field(auth).finish(),
            None if self.is_none() => f.write_str("Options(None)"),
            None => f.write_str("Options(..)"),
        }
    }
}
