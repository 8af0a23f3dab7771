use crate::cache::CacheKey;
use crate::pokemon::Pokemon;
use crate::r#static::COALESCE_TIMEOUT_SECONDS;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use futures::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Configuration for request coalescing
#[derive(Clone, Debug)]
pub struct CoalescerConfig {
    /// How long a waiter is kept before timing out
    pub request_timeout: Duration,
    /// Whether coalescing is enabled
    pub enabled: bool,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::seconds(COALESCE_TIMEOUT_SECONDS),
            enabled: true,
        }
    }
}

type Waiter = Arc<tokio::sync::Mutex<Option<oneshot::Sender<Vec<Pokemon>>>>>;

/// Collapses concurrent identical aggregate fetches into one execution.
/// The first caller for a key runs the fetch; callers arriving while it is
/// in flight wait for that result instead of hitting upstream again.
pub struct RequestCoalescer {
    pending: DashMap<CacheKey, (DateTime<Utc>, Vec<Waiter>)>,
    config: CoalescerConfig,
}

impl RequestCoalescer {
    pub fn new(config: CoalescerConfig) -> Self {
        Self {
            pending: DashMap::new(),
            config,
        }
    }

    /// Run `fetch_fn` for `key`, or wait for an in-flight run of it.
    pub async fn execute<F, Fut>(
        &self,
        key: CacheKey,
        fetch_fn: F,
    ) -> Result<Vec<Pokemon>, CoalesceError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Vec<Pokemon>> + Send + 'static,
    {
        if !self.config.enabled {
            return Ok(fetch_fn().await);
        }

        self.cleanup_expired();

        if let Some(mut entry) = self.pending.get_mut(&key) {
            log::debug!("Fetch already in flight for key: {:?}", key);

            let (tx, rx) = oneshot::channel();
            let waiter = Arc::new(tokio::sync::Mutex::new(Some(tx)));
            entry.1.push(waiter);
            drop(entry);

            let timeout = self
                .config
                .request_timeout
                .to_std()
                .unwrap_or_else(|_| std::time::Duration::from_secs(30));

            return match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(result)) => {
                    log::debug!("Received coalesced result for key: {:?}", key);
                    Ok(result)
                }
                Ok(Err(_)) => {
                    log::warn!("Sender dropped for key: {:?}", key);
                    Err(CoalesceError::SenderDropped)
                }
                Err(_) => {
                    log::warn!("Coalesced wait timed out for key: {:?}", key);
                    Err(CoalesceError::Timeout)
                }
            };
        }

        log::debug!("Executing new fetch for key: {:?}", key);
        self.pending.insert(key.clone(), (Utc::now(), vec![]));

        let result = fetch_fn().await;

        if let Some((_, (_, waiters))) = self.pending.remove(&key) {
            log::debug!("Notifying {} waiters for key: {:?}", waiters.len(), key);

            for waiter in waiters {
                if let Ok(mut sender_opt) = waiter.try_lock() {
                    if let Some(sender) = sender_opt.take() {
                        let _ = sender.send(result.clone());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Drop pending entries older than the timeout; their waiters see a
    /// dropped sender.
    fn cleanup_expired(&self) {
        let now = Utc::now();
        let expired_keys: Vec<_> = self
            .pending
            .iter()
            .filter(|entry| (now - entry.value().0) > self.config.request_timeout)
            .map(|entry| entry.key().clone())
            .collect();

        for key in expired_keys {
            if let Some((_, (_, waiters))) = self.pending.remove(&key) {
                log::debug!(
                    "Cleaning up expired fetch for key: {:?} with {} waiters",
                    key,
                    waiters.len()
                );
            }
        }
    }

    /// Get statistics about in-flight fetches
    pub fn stats(&self) -> CoalescerStats {
        let pending_fetches = self.pending.len();
        let total_waiters = self
            .pending
            .iter()
            .map(|entry| entry.value().1.len())
            .sum();

        CoalescerStats {
            pending_fetches,
            total_waiters,
        }
    }

    /// Clear all pending fetches
    pub fn clear(&self) {
        self.pending.clear();
        log::info!("Request coalescer cleared");
    }
}

/// Statistics for request coalescing
#[derive(Debug)]
pub struct CoalescerStats {
    pub pending_fetches: usize,
    pub total_waiters: usize,
}

/// Errors a coalesced waiter can observe
#[derive(Debug, thiserror::Error)]
pub enum CoalesceError {
    #[error("coalesced wait timed out")]
    Timeout,
    #[error("executing fetch went away")]
    SenderDropped,
}

/// Thread-safe wrapper for the coalescer
pub type SharedRequestCoalescer = Arc<RequestCoalescer>;
