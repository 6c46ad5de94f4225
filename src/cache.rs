//! Two cache tiers with different lifetimes.
//!
//! **Per-request memoization** lives in
//! [`RequestContext`](crate::context::RequestContext) and is discarded
//! with it. This module supplies its key type: `(resolver, item_key,
//! args_fingerprint)`. Two calls with different arguments for the same
//! item never share a slot; the only declared cache-insignificant
//! argument is the `echo` flag, which the fingerprint excludes.
//!
//! **Cross-request caches** (generated descriptions: one week;
//! domain-mapping lookups: one hour) go through the [`CacheStore`]
//! trait — an external key-value service with atomic get/set. Keys embed
//! a schema version token so upgrading the generation logic invalidates
//! stale entries automatically. Concurrent requests computing the same
//! key is an accepted race: values are immutable strings, last writer
//! wins.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Version of the description generation logic. Bump to invalidate every
/// cached generated description on upgrade.
const DESCRIPTION_CACHE_VERSION: u32 = 1;

/// Lifetime of cached generated descriptions.
pub const DESCRIPTION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Lifetime of adapter site-level lookups (mapped domain rows).
pub const DOMAIN_MAP_TTL: Duration = Duration::from_secs(60 * 60);

/// Which resolver a memo entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolver {
    Title,
    Description,
    Url,
}

/// Key for one per-request memo slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub resolver: Resolver,
    pub item_key: String,
    pub fingerprint: String,
}

impl MemoKey {
    pub fn new(resolver: Resolver, item_key: String, fingerprint: String) -> Self {
        Self {
            resolver,
            item_key,
            fingerprint,
        }
    }
}

/// Short stable fingerprint of a JSON value (serde_json orders object
/// keys, so serialization is canonical).
pub fn fingerprint_value<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("fingerprint input must serialize");
    let digest = Sha256::digest(json.as_bytes());
    let hex = format!("{digest:x}");
    hex[..16].to_string()
}

/// Cache key for a generated description.
pub fn description_key(item_key: &str) -> String {
    format!("pagemeta:desc:v{DESCRIPTION_CACHE_VERSION}:{item_key}")
}

// =============================================================================
// Cross-request store
// =============================================================================

/// External key-value cache with per-entry TTL and atomic get/set.
///
/// The engine implements no mutual exclusion of its own; whatever backs
/// this trait (memcache, a DB table, [`MemoryStore`]) provides atomicity
/// per operation.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str, ttl: Duration);
    fn delete(&self, key: &str);
}

/// In-process [`CacheStore`] backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("cache store poisoned");
        let live = match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => None,
            None => return None,
        };
        if live.is_none() {
            entries.remove(key);
        }
        live
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let expires = Instant::now() + ttl;
        self.entries
            .lock()
            .expect("cache store poisoned")
            .insert(key.to_string(), (value.to_string(), expires));
    }

    fn delete(&self, key: &str) {
        self.entries.lock().expect("cache store poisoned").remove(key);
    }
}

// =============================================================================
// Site-level TTL slot
// =============================================================================

/// One site-level lookup result with a bounded lifetime.
///
/// Domain-mapping adapters hold their "mapped domain row" in one of
/// these so the lookup runs at most once per
/// [`DOMAIN_MAP_TTL`], independent of any per-request state.
#[derive(Debug, Default)]
pub struct TtlSlot<T: Clone> {
    slot: Mutex<Option<(T, Instant)>>,
}

impl<T: Clone> TtlSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value, or compute, store, and return it.
    pub fn get_or_insert_with(&self, ttl: Duration, compute: impl FnOnce() -> T) -> T {
        let mut slot = self.slot.lock().expect("ttl slot poisoned");
        if let Some((value, expires)) = slot.as_ref()
            && *expires > Instant::now()
        {
            return value.clone();
        }
        let value = compute();
        *slot = Some((value.clone(), Instant::now() + ttl));
        value
    }

    /// Drop the cached value, forcing the next access to recompute.
    pub fn invalidate(&self) {
        *self.slot.lock().expect("ttl slot poisoned") = None;
    }
}

// =============================================================================
// Stats
// =============================================================================

/// Hit/miss counters for the generated-description cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cached, {} generated ({} total)",
            self.hits,
            self.misses,
            self.total()
        )
    }
}
