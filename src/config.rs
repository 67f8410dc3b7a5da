/// Application settings
///
/// There is no config file: everything the viewer needs to know about the
/// outside world lives here as constants, bundled into a `Settings` value
/// that is handed to the API client and the shell cache.

use std::path::PathBuf;
use std::time::Duration;

/// PokeAPI REST root
pub const API_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Animated Black/White sprites (normal); shiny variants live under `/shiny`
pub const ANIMATED_SPRITE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/versions/generation-v/black-white/animated";

/// Highest id covered by the animated sprite set
pub const ANIMATED_SPRITE_LIMIT: u32 = 649;

/// SVG icons for type tags, keyed by tag name
pub const TYPE_ICON_URL: &str =
    "https://raw.githubusercontent.com/duiker101/pokemon-type-svg-icons/master/icons";

/// Changing this name installs a fresh shell cache and orphans the old one
pub const SHELL_CACHE_NAME: &str = "pokedex-shell-v1";

/// Placeholder used when no flavor text matches a preferred language
pub const DESCRIPTION_UNAVAILABLE: &str = "Description unavailable.";

/// Placeholder for a missing habitat or an empty encounter list
pub const UNKNOWN: &str = "Unknown";

/// Every tag the catalog knows about; the shell manifest carries one icon per tag
pub const ALL_TAGS: [&str; 18] = [
    "normal", "fighting", "flying", "poison", "ground", "rock", "bug", "ghost", "steel",
    "fire", "water", "grass", "electric", "psychic", "ice", "dragon", "dark", "fairy",
];

/// A contiguous, inclusive id range loaded as one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

pub const GENERATIONS: [Generation; 9] = [
    Generation { name: "Generation 1", start: 1, end: 151 },
    Generation { name: "Generation 2", start: 152, end: 251 },
    Generation { name: "Generation 3", start: 252, end: 386 },
    Generation { name: "Generation 4", start: 387, end: 493 },
    Generation { name: "Generation 5", start: 494, end: 649 },
    Generation { name: "Generation 6", start: 650, end: 721 },
    Generation { name: "Generation 7", start: 722, end: 809 },
    Generation { name: "Generation 8", start: 810, end: 905 },
    Generation { name: "Generation 9", start: 906, end: 1025 },
];

/// Runtime settings shared by the API client and the shell cache
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub animated_sprite_url: String,
    pub type_icon_url: String,
    /// Description languages in priority order
    pub languages: Vec<String>,
    pub cache_name: String,
    pub cache_root: PathBuf,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            animated_sprite_url: ANIMATED_SPRITE_URL.to_string(),
            type_icon_url: TYPE_ICON_URL.to_string(),
            languages: vec!["pt".to_string(), "en".to_string()],
            cache_name: SHELL_CACHE_NAME.to_string(),
            cache_root: get_cache_root(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    /// Icon locator for a type tag
    pub fn type_icon(&self, tag: &str) -> String {
        format!("{}/{}.svg", self.type_icon_url, tag)
    }
}

/// Get the shell cache root directory
/// Returns ~/.cache/pokedex-viewer/shell on Linux
pub fn get_cache_root() -> PathBuf {
    let mut path = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);

    path.push("pokedex-viewer");
    path.push("shell");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_are_contiguous() {
        for pair in GENERATIONS.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
        assert_eq!(GENERATIONS[0].start, 1);
        assert_eq!(GENERATIONS[8].end, 1025);
    }

    #[test]
    fn type_icon_is_keyed_by_tag() {
        let settings = Settings::default();
        assert!(settings.type_icon("fire").ends_with("/icons/fire.svg"));
    }
}
