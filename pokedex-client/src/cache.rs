use crate::pokemon::{Locator, Pokemon};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Configuration for the catalog cache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// How long to keep listings; `None` keeps them for the process lifetime
    pub listing_ttl: Option<Duration>,
    /// How long to keep aggregate tables; `None` keeps them for the process lifetime
    pub details_ttl: Option<Duration>,
    /// Maximum number of cached entries; `None` means unbounded
    pub max_entries: Option<usize>,
    /// Whether caching is enabled
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listing_ttl: None,
            details_ttl: None,
            max_entries: None,
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// Cache with a shared TTL and a capacity bound, for long-lived processes.
    pub fn bounded(ttl: Duration, max_entries: usize) -> Self {
        Self {
            listing_ttl: Some(ttl),
            details_ttl: Some(ttl),
            max_entries: Some(max_entries),
            enabled: true,
        }
    }
}

/// Cache key derived from the effective input of the wrapped call.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum CacheKey {
    Listing(String),
    Details(String),
}

impl CacheKey {
    /// Key for a listing fetch: the limit is the whole effective input.
    pub fn from_listing(limit: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(limit.to_be_bytes());
        CacheKey::Listing(hex::encode(hasher.finalize()))
    }

    /// Key for an aggregate fetch: the ordered content of the locator
    /// collection, so equal-by-value inputs share a key.
    pub fn from_locators(locators: &[Locator]) -> Self {
        let mut hasher = Sha256::new();
        for locator in locators {
            hasher.update(locator.name().as_bytes());
            hasher.update([0u8]);
            hasher.update(locator.url().as_bytes());
            hasher.update([0u8]);
        }
        CacheKey::Details(hex::encode(hasher.finalize()))
    }
}

/// Either of the two cacheable results.
#[derive(Clone, Debug)]
pub enum CachedValue {
    Listing(Vec<Locator>),
    Details(Vec<Pokemon>),
}

/// Cached value with validity metadata
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub value: CachedValue,
    pub created_at: DateTime<Utc>,
    pub ttl: Option<Duration>,
}

impl CachedEntry {
    pub fn new(value: CachedValue, ttl: Option<Duration>) -> Self {
        Self {
            value,
            created_at: Utc::now(),
            ttl,
        }
    }

    /// Check if the entry is still valid; entries without a TTL never expire.
    pub fn is_valid(&self) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => Utc::now() < self.created_at + ttl,
        }
    }
}

/// In-memory cache implementation using DashMap for thread safety
pub struct CatalogCache {
    cache: DashMap<CacheKey, CachedEntry>,
    pub config: CacheConfig,
}

impl CatalogCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get a cached listing if available and valid
    pub fn get_listing(&self, key: &CacheKey) -> Option<Vec<Locator>> {
        match self.get(key) {
            Some(CachedValue::Listing(listing)) => Some(listing),
            _ => None,
        }
    }

    /// Get a cached aggregate table if available and valid
    pub fn get_details(&self, key: &CacheKey) -> Option<Vec<Pokemon>> {
        match self.get(key) {
            Some(CachedValue::Details(details)) => Some(details),
            _ => None,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        if !self.config.enabled {
            return None;
        }

        if let Some(cached) = self.cache.get(key) {
            if cached.is_valid() {
                log::debug!("Cache hit for key: {:?}", key);
                return Some(cached.value.clone());
            }
            log::debug!("Cache expired for key: {:?}", key);
            drop(cached);
            self.cache.remove(key);
        }

        log::debug!("Cache miss for key: {:?}", key);
        None
    }

    /// Store a listing in the cache
    pub fn put_listing(&self, key: CacheKey, listing: Vec<Locator>) {
        self.put(key, CachedValue::Listing(listing), self.config.listing_ttl);
    }

    /// Store an aggregate table in the cache
    pub fn put_details(&self, key: CacheKey, details: Vec<Pokemon>) {
        self.put(key, CachedValue::Details(details), self.config.details_ttl);
    }

    fn put(&self, key: CacheKey, value: CachedValue, ttl: Option<Duration>) {
        if !self.config.enabled {
            return;
        }

        if let Some(max_entries) = self.config.max_entries {
            if self.cache.len() >= max_entries {
                self.evict_expired();

                if self.cache.len() >= max_entries {
                    self.evict_oldest(max_entries);
                }
            }
        }

        self.cache.insert(key.clone(), CachedEntry::new(value, ttl));
        log::debug!("Stored in cache with key: {:?}", key);
    }

    /// Remove expired entries from cache
    pub fn evict_expired(&self) {
        let expired_keys: Vec<_> = self
            .cache
            .iter()
            .filter(|entry| !entry.value().is_valid())
            .map(|entry| entry.key().clone())
            .collect();

        let expired_count = expired_keys.len();

        for key in expired_keys {
            self.cache.remove(&key);
        }

        log::debug!("Evicted {} expired cache entries", expired_count);
    }

    /// Remove oldest entries when at capacity
    fn evict_oldest(&self, max_entries: usize) {
        let mut entries: Vec<_> = self
            .cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().created_at))
            .collect();

        entries.sort_by_key(|(_, created_at)| *created_at);

        let to_remove = (max_entries / 4).max(1);
        for (key, _) in entries.into_iter().take(to_remove) {
            self.cache.remove(&key);
        }

        log::debug!("Evicted {} oldest cache entries", to_remove);
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        self.cache.clear();
        log::info!("Cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let total_entries = self.cache.len();
        let expired_entries = self
            .cache
            .iter()
            .filter(|entry| !entry.value().is_valid())
            .count();

        CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
            max_entries: self.config.max_entries,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub max_entries: Option<usize>,
}

/// Thread-safe wrapper for the cache
pub type SharedCatalogCache = Arc<CatalogCache>;
