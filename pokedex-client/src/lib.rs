pub mod cache;
mod error;
mod filter;
mod pokemon;
mod singleflight;
mod source;
mod r#static;
mod utils;

#[cfg(test)]
mod tests;

use cache::{CacheConfig, CacheKey, CatalogCache, SharedCatalogCache};
pub use error::Error;
pub use error::ErrorKind;
pub use filter::{ability_facets, apply, type_facets, Facet, FilterOptions};
use futures::stream::{self, StreamExt};
pub use pokemon::Locator;
pub use pokemon::Pokemon;
use singleflight::SharedRequestCoalescer;
pub use singleflight::{CoalesceError, CoalescerConfig, RequestCoalescer};
pub use source::{EntitySource, PokeApi};
pub use r#static::{DEFAULT_LISTING_LIMIT, DETAIL_CONCURRENCY, POKEAPI_BASE_URL};
use std::sync::Arc;

// Re-export cache types
pub use cache::{CacheStats, CachedEntry};

#[derive(Clone)]
pub struct PokedexClient {
    source: Arc<dyn EntitySource>,
    cache: Option<SharedCatalogCache>,
    coalescer: SharedRequestCoalescer,
    detail_concurrency: usize,
}

impl Default for PokedexClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PokedexClient {
    /// Create a client against the live PokéAPI without caching
    pub fn new() -> Self {
        Self::with_source(Arc::new(PokeApi::new()))
    }

    /// Create a client against the live PokéAPI with caching enabled
    pub fn with_cache(cache_config: CacheConfig) -> Self {
        Self::with_source_and_cache(Arc::new(PokeApi::new()), cache_config)
    }

    /// Create a client over a custom source without caching
    pub fn with_source(source: Arc<dyn EntitySource>) -> Self {
        Self {
            source,
            cache: None,
            coalescer: Arc::new(RequestCoalescer::new(CoalescerConfig::default())),
            detail_concurrency: DETAIL_CONCURRENCY,
        }
    }

    /// Create a client over a custom source with caching enabled
    pub fn with_source_and_cache(
        source: Arc<dyn EntitySource>,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            cache: Some(Arc::new(CatalogCache::new(cache_config))),
            ..Self::with_source(source)
        }
    }

    /// Override the number of detail requests kept in flight at once
    pub fn detail_concurrency(mut self, width: usize) -> Self {
        self.detail_concurrency = width.max(1);
        self
    }

    /// Fetch the listing of up to `limit` catalog entries.
    ///
    /// Unlike the detail path this call is not failure tolerant: a transport
    /// error or non-success status propagates, since nothing downstream is
    /// meaningful without a listing.
    pub async fn fetch_listing(&self, limit: u32) -> Result<Vec<Locator>, Error> {
        let cache_key = CacheKey::from_listing(limit);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get_listing(&cache_key) {
                log::info!("Returning cached listing for limit {}", limit);
                return Ok(cached);
            }
        }

        let listing = self.source.listing(limit).await?;

        if let Some(cache) = &self.cache {
            cache.put_listing(cache_key, listing.clone());
        }

        Ok(listing)
    }

    /// Fetch detail records for every locator and aggregate the usable ones.
    ///
    /// Issues exactly one request per locator over a bounded-width stream
    /// and collects results as they complete, so the output order follows
    /// completion order rather than input order. A locator whose fetch
    /// fails, or whose record has no front sprite, contributes nothing;
    /// such drops are reported on the debug log only.
    pub async fn fetch_all_details(&self, locators: &[Locator]) -> Vec<Pokemon> {
        if locators.is_empty() {
            return vec![];
        }

        let cache_key = CacheKey::from_locators(locators);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get_details(&cache_key) {
                log::info!(
                    "Returning cached aggregate for {} locators",
                    locators.len()
                );
                return cached;
            }
        }

        let source = Arc::clone(&self.source);
        let batch = locators.to_vec();
        let width = self.detail_concurrency;

        let result = match self
            .coalescer
            .execute(cache_key.clone(), move || async move {
                execute_details_internal(source, batch, width).await
            })
            .await
        {
            Ok(result) => result,
            Err(err) => {
                log::warn!("Coalesced detail fetch failed ({}), fetching directly", err);
                execute_details_internal(
                    Arc::clone(&self.source),
                    locators.to_vec(),
                    width,
                )
                .await
            }
        };

        if let Some(cache) = &self.cache {
            cache.put_details(cache_key, result.clone());
        }

        result
    }

    /// Convenience: listing plus aggregation in one call
    pub async fn fetch_catalog(&self, limit: u32) -> Result<Vec<Pokemon>, Error> {
        let listing = self.fetch_listing(limit).await?;
        Ok(self.fetch_all_details(&listing).await)
    }

    /// Get cache statistics if caching is enabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    /// Clear cache if caching is enabled
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Evict expired cache entries if caching is enabled
    pub fn evict_expired_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.evict_expired();
        }
    }
}

/// Fan the detail fetch out over the locators with at most `width` requests
/// in flight, keeping only successfully parsed records that carry an image.
async fn execute_details_internal(
    source: Arc<dyn EntitySource>,
    locators: Vec<Locator>,
    width: usize,
) -> Vec<Pokemon> {
    stream::iter(locators)
        .map(|locator| {
            let source = Arc::clone(&source);
            async move {
                match source.detail(locator.url()).await {
                    Ok(pokemon) => Some(pokemon),
                    Err(err) => {
                        log::debug!("Dropping {}: {}", locator.name(), err);
                        None
                    }
                }
            }
        })
        .buffer_unordered(width.max(1))
        .filter_map(|fetched| async move {
            match fetched {
                Some(pokemon) if pokemon.has_image() => Some(pokemon),
                Some(pokemon) => {
                    log::debug!("Dropping {}: no front sprite", pokemon.name());
                    None
                }
                None => None,
            }
        })
        .collect()
        .await
}
