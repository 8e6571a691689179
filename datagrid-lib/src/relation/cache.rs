//! Relation cache backed by DashMap.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;

use crate::model::Record;
use crate::model::Value;

/// Bounds for a [`RelationCache`].
///
/// Both bounds are off by default: entries live as long as the cache.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::relation::RelationCacheConfig;
///
/// let config = RelationCacheConfig::default()
///     .with_ttl(Duration::from_secs(300))
///     .with_max_entries(10_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelationCacheConfig {
    /// How long an entry stays valid.
    pub ttl: Option<Duration>,
    /// Maximum number of entries; the oldest entry is evicted first.
    pub max_entries: Option<usize>,
}

impl RelationCacheConfig {
    /// Sets the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the maximum number of entries.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

/// A cached relation lookup. `entity` is `None` for a lookup that found
/// nothing.
#[derive(Debug, Clone)]
pub struct CachedRelation {
    /// The related entity, if it exists.
    pub entity: Option<Record>,
    /// When the entry was stored.
    pub created_at: DateTime<Utc>,
    /// When the entry stops being returned.
    pub expires_at: Option<DateTime<Utc>>,
    seq: u64,
}

impl CachedRelation {
    /// Returns `true` if this entry has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// Memoizes related entities under `"<table>:<id>"` keys.
///
/// Shared by reference between a table and whoever else needs it; all
/// methods take `&self`.
#[derive(Debug, Default)]
pub struct RelationCache {
    store: DashMap<String, CachedRelation>,
    config: RelationCacheConfig,
    next_seq: AtomicU64,
}

impl RelationCache {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache with the given bounds.
    pub fn with_config(config: RelationCacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Builds the cache key for a foreign key value.
    pub fn key(table: &str, id: &Value) -> String {
        format!("{}:{}", table, id.to_display_string())
    }

    /// Looks up a key.
    ///
    /// Returns `None` on a miss, `Some(None)` for a cached not-found and
    /// `Some(Some(entity))` for a cached entity.
    pub fn get(&self, key: &str) -> Option<Option<Record>> {
        let entry = self.store.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        Some(entry.entity.clone())
    }

    /// Stores a lookup result, evicting the oldest entry when full.
    pub fn insert(&self, key: impl Into<String>, entity: Option<Record>) {
        let key = key.into();
        if let Some(max) = self.config.max_entries {
            if max == 0 {
                return;
            }
            while !self.store.contains_key(&key) && self.store.len() >= max {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let created_at = Utc::now();
        let expires_at = self
            .config
            .ttl
            .map(|ttl| created_at + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()));
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.store.insert(
            key,
            CachedRelation {
                entity,
                created_at,
                expires_at,
                seq,
            },
        );
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .store
            .iter()
            .min_by_key(|entry| entry.value().seq)
            .map(|entry| entry.key().clone());
        match oldest {
            Some(key) => self.store.remove(&key).is_some(),
            None => false,
        }
    }

    /// Removes a key.
    pub fn remove(&self, key: &str) {
        self.store.remove(key);
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn gc(&self) -> usize {
        let mut removed = 0;
        self.store.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Returns the number of entries (including expired ones).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
