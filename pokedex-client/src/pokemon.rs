use getset::Getters;
use serde::{Deserialize, Serialize};

/// One entry of the paginated listing: an entity name plus the URL of its
/// detail resource. Immutable once fetched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct Locator {
    name: String,
    url: String,
}

impl Locator {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Fully parsed detail record for one catalog entity.
///
/// Constructed all at once from a single upstream response; a failed fetch
/// produces no record at all, never a partial one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct Pokemon {
    name: String,
    image: Option<String>,
    types: Vec<String>,
    abilities: Vec<String>,
    base_experience: i64,
}

impl Pokemon {
    pub fn new(
        name: impl Into<String>,
        image: Option<String>,
        types: Vec<String>,
        abilities: Vec<String>,
        base_experience: i64,
    ) -> Self {
        Self {
            name: name.into(),
            image,
            types,
            abilities,
            base_experience,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
