/// Shared data structures for the application state
///
/// These structs are the normalized shape of what the API returns. They flow
/// from the fetcher into the catalog and from there into the view models.

/// Image locators for one record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpriteRefs {
    pub normal: Option<String>,
    /// Shown on hover / toggle; absent means no swap
    pub alternate: Option<String>,
}

/// Represents a single creature in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Externally assigned, unique within the catalog
    pub id: u32,
    /// Lowercase API name (e.g., "bulbasaur")
    pub name: String,
    /// One or two lowercase tags in slot order
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    /// Decimetres, as reported by the API
    pub height: u32,
    /// Hectograms, as reported by the API
    pub weight: u32,
    pub description: String,
    pub sprites: SpriteRefs,
}

impl Record {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// Base stat entry, in the API's native order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub base: u32,
}

/// Extended data shown in the detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub record: Record,
    pub moves: Vec<String>,
    pub stats: Vec<Stat>,
    pub habitat: Option<String>,
    /// Encounter location-area names, raw (hyphenated)
    pub locations: Vec<String>,
}
