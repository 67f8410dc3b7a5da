/// PokeAPI payload shapes
///
/// Only the fields the viewer reads are modelled; serde ignores the rest.

use serde::Deserialize;

/// `{ "name": ..., "url": ... }` reference used throughout the API
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NamedResource {
    pub name: String,
}

/// `/pokemon/{id}`
#[derive(Deserialize, Debug, Clone)]
pub struct PokemonPayload {
    pub id: u32,
    pub name: String,
    /// Decimetres
    pub height: u32,
    /// Hectograms
    pub weight: u32,
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub sprites: SpritesPayload,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub entry: NamedResource,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StatSlot {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SpritesPayload {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
}

/// `/pokemon-species/{id}`
#[derive(Deserialize, Debug, Clone)]
pub struct SpeciesPayload {
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    pub habitat: Option<NamedResource>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

/// One element of `/pokemon/{id}/encounters`
#[derive(Deserialize, Debug, Clone)]
pub struct EncounterPayload {
    pub location_area: NamedResource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pokemon_payload_ignores_unknown_fields() {
        let json = serde_json::json!({
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "base_experience": 112,
            "types": [{ "slot": 1, "type": { "name": "electric", "url": "x" } }],
            "sprites": { "front_default": "a.png", "front_shiny": null, "back_default": "b.png" }
        });

        let payload: PokemonPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.types[0].kind.name, "electric");
        assert!(payload.moves.is_empty());
        assert_eq!(payload.sprites.front_default.as_deref(), Some("a.png"));
        assert!(payload.sprites.front_shiny.is_none());
    }

    #[test]
    fn species_habitat_may_be_null() {
        let json = serde_json::json!({ "flavor_text_entries": [], "habitat": null });
        let payload: SpeciesPayload = serde_json::from_value(json).unwrap();
        assert!(payload.habitat.is_none());
    }
}
