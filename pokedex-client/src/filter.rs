use crate::pokemon::Pokemon;
use getset::Getters;
use std::collections::BTreeSet;

/// One categorical selection: everything, or a single lower-cased value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Facet {
    All,
    Value(String),
}

impl Facet {
    /// Parse a raw selection. `"all"` (any casing) and the empty string
    /// select everything.
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if value.is_empty() || value == "all" {
            Facet::All
        } else {
            Facet::Value(value)
        }
    }

    fn matches(&self, tags: &[String]) -> bool {
        match self {
            Facet::All => true,
            Facet::Value(value) => tags.iter().any(|tag| tag.to_lowercase() == *value),
        }
    }
}

/// The two categorical filters of the consumer-facing query surface.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[get = "pub"]
pub struct FilterOptions {
    selected_type: Facet,
    selected_ability: Facet,
}

impl FilterOptions {
    pub fn new(selected_type: &str, selected_ability: &str) -> Self {
        Self {
            selected_type: Facet::parse(selected_type),
            selected_ability: Facet::parse(selected_ability),
        }
    }

    /// Exact case-insensitive membership test against both tag sequences.
    pub fn matches(&self, pokemon: &Pokemon) -> bool {
        self.selected_type.matches(pokemon.types())
            && self.selected_ability.matches(pokemon.abilities())
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            selected_type: Facet::All,
            selected_ability: Facet::All,
        }
    }
}

/// Distinct lower-cased type names observed across the table, sorted.
pub fn type_facets(table: &[Pokemon]) -> Vec<String> {
    facet_values(table, |pokemon| pokemon.types())
}

/// Distinct lower-cased ability names observed across the table, sorted.
pub fn ability_facets(table: &[Pokemon]) -> Vec<String> {
    facet_values(table, |pokemon| pokemon.abilities())
}

fn facet_values<'a, F>(table: &'a [Pokemon], tags: F) -> Vec<String>
where
    F: Fn(&'a Pokemon) -> &'a Vec<String>,
{
    let values: BTreeSet<String> = table
        .iter()
        .flat_map(|pokemon| tags(pokemon).iter().map(|tag| tag.to_lowercase()))
        .collect();
    values.into_iter().collect()
}

/// Apply both filters to a table, preserving its order.
pub fn apply(table: &[Pokemon], options: &FilterOptions) -> Vec<Pokemon> {
    table
        .iter()
        .filter(|pokemon| options.matches(pokemon))
        .cloned()
        .collect()
}
