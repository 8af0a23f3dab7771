use super::EntitySource;
use crate::error::{Error, ErrorKind};
use crate::pokemon::{Locator, Pokemon};
use crate::r#static::POKEAPI_BASE_URL;
use crate::utils::capitalize;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use surf::Client;
use ::utils::surf_logging::SurfLogging;

/// PokéAPI-backed implementation of [`EntitySource`].
#[derive(Clone)]
pub struct PokeApi {
    http: Client,
    base_url: String,
}

impl PokeApi {
    pub fn new() -> Self {
        Self::with_base_url(POKEAPI_BASE_URL)
    }

    /// Point the source at a different base URL, e.g. a local stub server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new().with(SurfLogging),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let mut response = self
            .http
            .get(url)
            .await
            .map_err(|err| ErrorKind::request(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErrorKind::status(url, status));
        }

        response
            .body_json::<T>()
            .await
            .map_err(|err| ErrorKind::decode(url, err))
    }
}

impl Default for PokeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntitySource for PokeApi {
    async fn listing(&self, limit: u32) -> Result<Vec<Locator>, Error> {
        let url = format!("{}/pokemon?limit={}", self.base_url, limit);
        let body: ListingResponse = self.get_json(&url).await?;
        Ok(body.results)
    }

    async fn detail(&self, url: &str) -> Result<Pokemon, Error> {
        let body: DetailResponse = self.get_json(url).await?;
        Ok(body.into())
    }
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    results: Vec<Locator>,
}

/// Wire shape of the detail endpoint, reduced to the fields we keep.
#[derive(Debug, Deserialize)]
struct DetailResponse {
    name: String,
    base_experience: i64,
    sprites: Sprites,
    types: Vec<TypeSlot>,
    abilities: Vec<AbilitySlot>,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: NamedResource,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

impl From<DetailResponse> for Pokemon {
    fn from(response: DetailResponse) -> Self {
        Pokemon::new(
            capitalize(&response.name),
            response.sprites.front_default,
            response
                .types
                .into_iter()
                .map(|slot| slot.kind.name)
                .collect(),
            response
                .abilities
                .into_iter()
                .map(|slot| slot.ability.name)
                .collect(),
            response.base_experience,
        )
    }
}
