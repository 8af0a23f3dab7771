mod pokeapi;

pub use pokeapi::PokeApi;

use crate::error::Error;
use crate::pokemon::{Locator, Pokemon};
use async_trait::async_trait;

/// Transport seam for the two catalog endpoints.
///
/// The production implementation talks to the PokéAPI over HTTP; tests
/// substitute an in-memory source.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch the paginated listing, capped at `limit` entries, preserving
    /// server-returned order.
    async fn listing(&self, limit: u32) -> Result<Vec<Locator>, Error>;

    /// Fetch and parse the detail record behind one locator URL. One
    /// request, no retries; any transport, status or decode problem is an
    /// `Err`.
    async fn detail(&self, url: &str) -> Result<Pokemon, Error>;
}
