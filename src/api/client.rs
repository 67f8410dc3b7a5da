/// PokeAPI client
///
/// Builds the three endpoint URLs for an id, fetches them through the
/// [`Transport`] and normalizes the payloads into [`Record`] / [`Detail`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{EncounterPayload, FlavorTextEntry, PokemonPayload, SpeciesPayload};
use super::transport::Transport;
use crate::config::{Settings, ANIMATED_SPRITE_LIMIT, DESCRIPTION_UNAVAILABLE};
use crate::error::FetchError;
use crate::state::data::{Detail, Record, SpriteRefs, Stat};

/// Cheap to clone; every background task gets its own handle
#[derive(Clone)]
pub struct PokeApi {
    transport: Arc<dyn Transport>,
    settings: Arc<Settings>,
}

impl PokeApi {
    pub fn new(transport: Arc<dyn Transport>, settings: Arc<Settings>) -> Self {
        Self { transport, settings }
    }

    pub fn pokemon_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}", self.settings.api_base_url, id)
    }

    pub fn species_url(&self, id: u32) -> String {
        format!("{}/pokemon-species/{}", self.settings.api_base_url, id)
    }

    pub fn encounters_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}/encounters", self.settings.api_base_url, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let body = self.transport.get(&url).await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url, source })
    }

    /// Fetch primary and species data concurrently and build a card record
    pub async fn fetch_record(&self, id: u32) -> Result<Record, FetchError> {
        let (pokemon, species) = tokio::try_join!(
            self.get_json::<PokemonPayload>(self.pokemon_url(id)),
            self.get_json::<SpeciesPayload>(self.species_url(id)),
        )?;

        debug!(id, name = %pokemon.name, "fetched record");
        Ok(self.build_record(&pokemon, &species))
    }

    /// Fetch everything the detail view needs; any failure fails the whole detail
    pub async fn fetch_detail(&self, id: u32) -> Result<Detail, FetchError> {
        let (pokemon, species, encounters) = tokio::try_join!(
            self.get_json::<PokemonPayload>(self.pokemon_url(id)),
            self.get_json::<SpeciesPayload>(self.species_url(id)),
            self.get_json::<Vec<EncounterPayload>>(self.encounters_url(id)),
        )?;

        let record = self.build_record(&pokemon, &species);

        Ok(Detail {
            record,
            moves: pokemon.moves.iter().map(|m| m.entry.name.clone()).collect(),
            stats: pokemon
                .stats
                .iter()
                .map(|s| Stat {
                    name: s.stat.name.clone(),
                    base: s.base_stat,
                })
                .collect(),
            habitat: species.habitat.map(|h| h.name),
            locations: encounters.into_iter().map(|e| e.location_area.name).collect(),
        })
    }

    fn build_record(&self, pokemon: &PokemonPayload, species: &SpeciesPayload) -> Record {
        let description = select_description(&species.flavor_text_entries, &self.settings.languages)
            .unwrap_or_else(|| DESCRIPTION_UNAVAILABLE.to_string());

        Record {
            id: pokemon.id,
            name: pokemon.name.clone(),
            types: pokemon
                .types
                .iter()
                .map(|t| t.kind.name.to_lowercase())
                .collect(),
            abilities: pokemon
                .abilities
                .iter()
                .map(|a| a.ability.name.clone())
                .collect(),
            height: pokemon.height,
            weight: pokemon.weight,
            description,
            sprites: self.sprite_refs(pokemon),
        }
    }

    /// Animated sprites cover the first five generations; later ids fall back
    /// to the API's static front sprites
    fn sprite_refs(&self, pokemon: &PokemonPayload) -> SpriteRefs {
        if pokemon.id <= ANIMATED_SPRITE_LIMIT {
            let base = &self.settings.animated_sprite_url;
            SpriteRefs {
                normal: Some(format!("{}/{}.gif", base, pokemon.id)),
                alternate: Some(format!("{}/shiny/{}.gif", base, pokemon.id)),
            }
        } else {
            SpriteRefs {
                normal: pokemon.sprites.front_default.clone(),
                alternate: pokemon.sprites.front_shiny.clone(),
            }
        }
    }
}

/// Pick the first entry in the highest-priority language that has one
pub fn select_description(entries: &[FlavorTextEntry], languages: &[String]) -> Option<String> {
    languages.iter().find_map(|lang| {
        entries
            .iter()
            .find(|entry| &entry.language.name == lang)
            .map(|entry| normalize_flavor_text(&entry.flavor_text))
    })
}

/// Flavor text carries form feeds and hard line breaks from the game cartridges
pub fn normalize_flavor_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{000C}' | '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}
