/// Base URL of the PokéAPI v2 REST interface.
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Listing size requested when the caller does not pick one.
pub const DEFAULT_LISTING_LIMIT: u32 = 150;

/// Number of detail requests kept in flight at once.
pub const DETAIL_CONCURRENCY: usize = 20;

/// Seconds a coalesced waiter is kept before timing out.
pub const COALESCE_TIMEOUT_SECONDS: i64 = 30;
