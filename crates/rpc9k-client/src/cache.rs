//! Per-root path cache.
//!
//! Keyed by the URL of the client a fetch started from plus the accumulated
//! `a:b:c` prefix, so clients further down a chain can share the root's cache
//! without colliding with the root's own entries. Only successful
//! transport-backed steps are stored, and only walks that start from a
//! transport-backed client read or write it.

use dashmap::DashMap;

use rpc9k_core::protocol::Envelope;

/// A resolved step: where it ended up and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub url: String,
    pub envelope: Envelope,
}

#[derive(Debug, Default)]
pub struct PathCache {
    entries: DashMap<(String, String), Resolved>,
}

impl PathCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, origin: &str, path: &str) -> Option<Resolved> {
        self.entries
            .get(&(origin.to_string(), path.to_string()))
            .map(|r| r.value().clone())
    }

    pub fn insert(&self, origin: &str, path: &str, resolved: Resolved) {
        self.entries
            .insert((origin.to_string(), path.to_string()), resolved);
    }

    pub fn contains(&self, origin: &str, path: &str) -> bool {
        self.entries
            .contains_key(&(origin.to_string(), path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
