use chrono::Duration;
use pokedex_client::{cache::CacheConfig, PokedexClient, DEFAULT_LISTING_LIMIT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    // Example 1: Basic client without caching
    println!("=== Basic Client ===");
    let basic_client = PokedexClient::new();

    let start = std::time::Instant::now();
    let table = basic_client.fetch_catalog(DEFAULT_LISTING_LIMIT).await?;
    println!("Basic fetch took: {:?}", start.elapsed());
    println!("Aggregated {} records", table.len());

    // Example 2: Client with caching enabled
    println!("\n=== Client with Caching ===");
    let cache_config = CacheConfig::bounded(Duration::minutes(10), 500);
    let cached_client = PokedexClient::with_cache(cache_config);

    // First fetch (will be cached)
    let start = std::time::Instant::now();
    let table1 = cached_client.fetch_catalog(DEFAULT_LISTING_LIMIT).await?;
    let duration1 = start.elapsed();
    println!("First fetch took: {:?}", duration1);

    // Second fetch (should be from cache)
    let start = std::time::Instant::now();
    let table2 = cached_client.fetch_catalog(DEFAULT_LISTING_LIMIT).await?;
    let duration2 = start.elapsed();
    println!("Cached fetch took: {:?}", duration2);

    if duration2.as_millis() > 0 {
        println!(
            "Cache speedup: {:.2}x",
            duration1.as_millis() as f64 / duration2.as_millis() as f64
        );
    } else {
        println!("Cache speedup: Very fast (cached result)");
    }
    assert_eq!(table1.len(), table2.len());

    // Example 3: Cache management
    println!("\n=== Cache Management ===");
    println!("Cache stats: {:?}", cached_client.cache_stats());
    cached_client.evict_expired_cache();
    println!("Cache stats after cleanup: {:?}", cached_client.cache_stats());
    cached_client.clear_cache();
    println!("Cache stats after clear: {:?}", cached_client.cache_stats());

    Ok(())
}
