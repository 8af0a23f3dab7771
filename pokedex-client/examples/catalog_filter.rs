use pokedex_client::{
    ability_facets, apply, cache::CacheConfig, type_facets, FilterOptions, PokedexClient,
    DEFAULT_LISTING_LIMIT,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let client = PokedexClient::with_cache(CacheConfig::default());

    let table = client.fetch_catalog(DEFAULT_LISTING_LIMIT).await?;
    println!("Fetched {} Pokémon with sprites", table.len());

    println!("Types:     all, {}", type_facets(&table).join(", "));
    println!("Abilities: all, {}", ability_facets(&table).join(", "));

    // Pick a type the way the sidebar dropdown would.
    let selection = FilterOptions::new("grass", "all");
    let filtered = apply(&table, &selection);

    if filtered.is_empty() {
        println!("No Pokémon match the selected filters.");
        return Ok(());
    }

    println!("\n{} grass Pokémon:", filtered.len());
    for pokemon in &filtered {
        println!(
            "{:<12} types: {:<18} abilities: {:<28} base exp: {}",
            pokemon.name(),
            pokemon.types().join(", "),
            pokemon.abilities().join(", "),
            pokemon.base_experience()
        );
    }

    Ok(())
}
