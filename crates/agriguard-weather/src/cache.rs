//! Response cache for weather and geocoding requests.
//!
//! Entries are keyed by the full request URL (query parameters sorted) and
//! expire after a fixed TTL. The cache can optionally be backed by a JSON
//! file so repeated runs within the hour skip the network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::CacheError;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResponse {
    body: String,
    stored_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
    ttl: Duration,
    path: Option<PathBuf>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    /// In-memory cache. A zero TTL disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            path: None,
        }
    }

    /// Cache backed by `path`. Existing fresh entries are loaded; a missing
    /// file starts empty.
    pub fn with_file(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self, CacheError> {
        let path = path.into();
        let mut entries: HashMap<String, CachedResponse> = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };

        let now = Utc::now();
        entries.retain(|_, entry| is_fresh(entry, ttl, now));
        tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded response cache");

        Ok(Self {
            entries: Mutex::new(entries),
            ttl,
            path: Some(path),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Fresh body for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let fresh = entries
            .get(key)
            .map(|entry| is_fresh(entry, self.ttl, Utc::now()))?;
        if fresh {
            entries.get(key).map(|entry| entry.body.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    pub fn insert(&self, key: impl Into<String>, body: impl Into<String>) {
        self.insert_at(key, body, Utc::now());
    }

    pub(crate) fn insert_at(
        &self,
        key: impl Into<String>,
        body: impl Into<String>,
        stored_at: DateTime<Utc>,
    ) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.lock().insert(
            key.into(),
            CachedResponse {
                body: body.into(),
                stored_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| is_fresh(entry, self.ttl, now));
        before - entries.len()
    }

    /// Write fresh entries back to the backing file. No-op for in-memory caches.
    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        self.purge_expired();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = {
            let entries = self.entries.lock();
            serde_json::to_string(&*entries)?
        };
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "Persisted response cache");
        Ok(())
    }
}

fn is_fresh(entry: &CachedResponse, ttl: Duration, now: DateTime<Utc>) -> bool {
    // A timestamp in the future (clock skew) counts as just stored.
    (now - entry.stored_at)
        .to_std()
        .map(|age| age < ttl)
        .unwrap_or(true)
}

/// Cache key for a request: the URL with its query pairs sorted.
pub fn cache_key(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();

    let mut key = url.clone();
    key.set_fragment(None);
    if pairs.is_empty() {
        key.set_query(None);
    } else {
        key.query_pairs_mut().clear().extend_pairs(pairs);
    }
    key.to_string()
}
