use crate::cache::CacheConfig;
use crate::error::ErrorKind;
use crate::source::EntitySource;
use crate::{Error, FilterOptions, Locator, Pokemon, PokedexClient};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory source with canned responses and request counters.
struct MockSource {
    listing: Vec<Locator>,
    fail_listing: bool,
    details: DashMap<String, Pokemon>,
    detail_delay: Option<Duration>,
    listing_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockSource {
    fn new(listing: Vec<Locator>) -> Self {
        Self {
            listing,
            fail_listing: false,
            details: DashMap::new(),
            detail_delay: None,
            listing_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    fn failing_listing() -> Self {
        Self {
            fail_listing: true,
            ..Self::new(vec![])
        }
    }

    fn with_detail(self, url: &str, pokemon: Pokemon) -> Self {
        self.details.insert(url.to_string(), pokemon);
        self
    }

    fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }

    fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitySource for MockSource {
    async fn listing(&self, limit: u32) -> Result<Vec<Locator>, Error> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(ErrorKind::Request {
                url: "mock://listing".to_string(),
                message: "connection refused".to_string(),
            }
            .into());
        }
        Ok(self.listing.iter().take(limit as usize).cloned().collect())
    }

    async fn detail(&self, url: &str) -> Result<Pokemon, Error> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.detail_delay {
            tokio::time::sleep(delay).await;
        }
        self.details
            .get(url)
            .map(|entry| entry.clone())
            .ok_or_else(|| {
                ErrorKind::Request {
                    url: url.to_string(),
                    message: "unavailable".to_string(),
                }
                .into()
            })
    }
}

fn locator(name: &str, url: &str) -> Locator {
    Locator::new(name, url)
}

fn pokemon(name: &str, image: Option<&str>, types: &[&str], abilities: &[&str]) -> Pokemon {
    Pokemon::new(
        name,
        image.map(str::to_string),
        types.iter().map(|t| t.to_string()).collect(),
        abilities.iter().map(|a| a.to_string()).collect(),
        64,
    )
}

#[tokio::test]
async fn issues_one_detail_request_per_locator() {
    let locators = vec![
        locator("bulbasaur", "u1"),
        locator("ivysaur", "u2"),
        locator("venusaur", "u3"),
    ];
    let source = Arc::new(
        MockSource::new(locators.clone())
            .with_detail("u1", pokemon("Bulbasaur", Some("i1"), &["grass"], &["overgrow"]))
            .with_detail("u3", pokemon("Venusaur", Some("i3"), &["grass"], &["overgrow"])),
    );
    let client = PokedexClient::with_source(source.clone()).detail_concurrency(2);

    client.fetch_all_details(&locators).await;
    assert_eq!(source.detail_calls(), locators.len());

    // Without a cache a second call goes upstream again, once per locator.
    client.fetch_all_details(&locators).await;
    assert_eq!(source.detail_calls(), locators.len() * 2);
}

#[tokio::test]
async fn aggregate_keeps_only_parsed_records_with_images() {
    let locators = vec![
        locator("pidgey", "u1"),
        locator("missingno", "u2"),
        locator("shedinja", "u3"),
    ];
    let source = Arc::new(
        MockSource::new(locators.clone())
            .with_detail("u1", pokemon("Pidgey", Some("i1"), &["normal", "flying"], &["keen-eye"]))
            // u2 has no canned detail, so its fetch fails
            .with_detail("u3", pokemon("Shedinja", None, &["bug", "ghost"], &["wonder-guard"])),
    );
    let client = PokedexClient::with_source(source);

    let table = client.fetch_all_details(&locators).await;

    assert_eq!(table.len(), 1);
    assert_eq!(table[0].name(), "Pidgey");
}

#[tokio::test]
async fn failing_locator_drops_only_that_record() {
    let locators: Vec<_> = (1..=4)
        .map(|n| locator(&format!("mon{}", n), &format!("u{}", n)))
        .collect();
    let mut source = MockSource::new(locators.clone());
    for n in [1, 2, 4] {
        source = source.with_detail(
            &format!("u{}", n),
            pokemon(&format!("Mon{}", n), Some("img"), &["normal"], &["run-away"]),
        );
    }
    let client = PokedexClient::with_source(Arc::new(source));

    let table = client.fetch_all_details(&locators).await;

    let mut names: Vec<_> = table.iter().map(|p| p.name().as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Mon1", "Mon2", "Mon4"]);
}

#[tokio::test]
async fn bulbasaur_scenario() {
    let listing = vec![locator("bulbasaur", "u1"), locator("ivysaur", "u2")];
    let expected = pokemon("Bulbasaur", Some("img1"), &["grass", "poison"], &["overgrow"]);
    let source = Arc::new(MockSource::new(listing.clone()).with_detail("u1", expected.clone()));
    let client = PokedexClient::with_source(source);

    let table = client.fetch_all_details(&listing).await;

    assert_eq!(table, vec![expected]);
}

#[tokio::test]
async fn cached_listing_skips_second_upstream_call() {
    let listing = vec![locator("bulbasaur", "u1"), locator("ivysaur", "u2")];
    let source = Arc::new(MockSource::new(listing.clone()));
    let client =
        PokedexClient::with_source_and_cache(source.clone(), CacheConfig::default());

    let first = client.fetch_listing(2).await.unwrap();
    let second = client.fetch_listing(2).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(source.listing_calls(), 1);

    // A different limit is a different key and goes upstream.
    client.fetch_listing(1).await.unwrap();
    assert_eq!(source.listing_calls(), 2);
}

#[tokio::test]
async fn cached_aggregate_skips_refetch() {
    let locators = vec![locator("bulbasaur", "u1")];
    let source = Arc::new(
        MockSource::new(locators.clone())
            .with_detail("u1", pokemon("Bulbasaur", Some("i1"), &["grass"], &["overgrow"])),
    );
    let client =
        PokedexClient::with_source_and_cache(source.clone(), CacheConfig::default());

    let first = client.fetch_all_details(&locators).await;
    let second = client.fetch_all_details(&locators).await;

    assert_eq!(first, second);
    assert_eq!(source.detail_calls(), 1);
}

#[tokio::test]
async fn concurrent_identical_aggregate_fetches_share_one_execution() {
    // Single-flight choice: concurrent first calls for one key coalesce
    // instead of racing (sequential misses are covered by the cache).
    let locators = vec![locator("bulbasaur", "u1"), locator("ivysaur", "u2")];
    let source = Arc::new(
        MockSource::new(locators.clone())
            .with_detail("u1", pokemon("Bulbasaur", Some("i1"), &["grass"], &["overgrow"]))
            .with_detail("u2", pokemon("Ivysaur", Some("i2"), &["grass"], &["overgrow"]))
            .with_detail_delay(Duration::from_millis(50)),
    );
    let client =
        PokedexClient::with_source_and_cache(source.clone(), CacheConfig::default());

    let first = tokio::spawn({
        let client = client.clone();
        let locators = locators.clone();
        async move { client.fetch_all_details(&locators).await }
    });
    let second = tokio::spawn({
        let client = client.clone();
        let locators = locators.clone();
        async move { client.fetch_all_details(&locators).await }
    });

    let (mut first, mut second) = (first.await.unwrap(), second.await.unwrap());
    first.sort_by(|a, b| a.name().cmp(b.name()));
    second.sort_by(|a, b| a.name().cmp(b.name()));

    assert_eq!(first, second);
    assert_eq!(source.detail_calls(), locators.len());
}

#[tokio::test]
async fn listing_failure_propagates() {
    let client = PokedexClient::with_source(Arc::new(MockSource::failing_listing()));

    let result = client.fetch_listing(5).await;

    let err = result.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Request { .. }));
}

#[tokio::test]
async fn empty_locator_list_needs_no_requests() {
    let source = Arc::new(MockSource::new(vec![]));
    let client = PokedexClient::with_source(source.clone());

    let table = client.fetch_all_details(&[]).await;

    assert!(table.is_empty());
    assert_eq!(source.detail_calls(), 0);
}

#[tokio::test]
async fn catalog_pipeline_feeds_filter_surface() {
    let listing = vec![locator("charmander", "u1"), locator("squirtle", "u2")];
    let source = Arc::new(
        MockSource::new(listing.clone())
            .with_detail("u1", pokemon("Charmander", Some("i1"), &["fire"], &["blaze"]))
            .with_detail("u2", pokemon("Squirtle", Some("i2"), &["water"], &["torrent"])),
    );
    let client = PokedexClient::with_source(source);

    let table = client.fetch_catalog(2).await.unwrap();
    let filtered = crate::apply(&table, &FilterOptions::new("water", "all"));

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name(), "Squirtle");

    // An empty post-filter table is a defined state, not an error.
    assert!(crate::apply(&table, &FilterOptions::new("rock", "all")).is_empty());
}
