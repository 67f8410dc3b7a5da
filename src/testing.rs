/// Test doubles shared by the module test suites.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::transport::Transport;
use crate::error::FetchError;

/// In-memory transport that records every request and can inject failures
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, body: Vec<u8>) {
        self.responses.lock().expect("lock").insert(url.to_string(), body);
    }

    pub fn insert_json(&self, url: &str, value: serde_json::Value) {
        self.insert(url, serde_json::to_vec(&value).expect("json"));
    }

    pub fn inject_failure(&self, url: &str) {
        self.failures.lock().expect("lock").insert(url.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock").clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().expect("lock").iter().filter(|r| *r == url).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().expect("lock").push(url.to_string());

        if self.failures.lock().expect("lock").contains(url) {
            return Err(FetchError::Transport {
                url: url.to_string(),
                message: "injected failure".to_string(),
            });
        }

        self.responses
            .lock()
            .expect("lock")
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Holds the listed requests at a barrier until all of them are in flight.
/// A caller that awaits them one after another never gets past the first.
pub struct GatedTransport {
    inner: Arc<FakeTransport>,
    gated: HashSet<String>,
    barrier: tokio::sync::Barrier,
}

impl GatedTransport {
    pub fn new(inner: Arc<FakeTransport>, gated: &[String]) -> Self {
        Self {
            inner,
            gated: gated.iter().cloned().collect(),
            barrier: tokio::sync::Barrier::new(gated.len()),
        }
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if self.gated.contains(url) {
            self.barrier.wait().await;
        }
        self.inner.get(url).await
    }
}

pub mod fixtures {
    use super::*;
    use crate::api::client::PokeApi;
    use crate::config::Settings;
    use crate::state::data::{Record, SpriteRefs};

    pub const API_BASE: &str = "https://api.test";

    pub fn settings() -> Settings {
        Settings {
            api_base_url: API_BASE.to_string(),
            ..Settings::default()
        }
    }

    pub fn api(transport: Arc<FakeTransport>) -> PokeApi {
        PokeApi::new(transport, Arc::new(settings()))
    }

    /// Register pokemon, species and encounter payloads for one id
    pub fn install_creature(transport: &FakeTransport, id: u32, name: &str, types: &[&str]) {
        let types: Vec<_> = types
            .iter()
            .enumerate()
            .map(|(i, t)| serde_json::json!({ "slot": i + 1, "type": { "name": t, "url": "" } }))
            .collect();

        transport.insert_json(
            &format!("{API_BASE}/pokemon/{id}"),
            serde_json::json!({
                "id": id,
                "name": name,
                "height": 7,
                "weight": 69,
                "types": types,
                "abilities": [
                    { "ability": { "name": "overgrow" } },
                    { "ability": { "name": "chlorophyll" } }
                ],
                "moves": [
                    { "move": { "name": "thunder-shock" } },
                    { "move": { "name": "quick-attack" } }
                ],
                "stats": [
                    { "base_stat": 45, "stat": { "name": "hp" } },
                    { "base_stat": 49, "stat": { "name": "attack" } },
                    { "base_stat": 65, "stat": { "name": "special-attack" } }
                ],
                "sprites": {
                    "front_default": format!("https://sprites.test/{id}.png"),
                    "front_shiny": null
                }
            }),
        );

        transport.insert_json(
            &format!("{API_BASE}/pokemon-species/{id}"),
            serde_json::json!({
                "flavor_text_entries": [
                    { "flavor_text": "nihongo", "language": { "name": "ja" } },
                    { "flavor_text": format!("{name} lore\nline one\u{000C}line two"), "language": { "name": "en" } }
                ],
                "habitat": { "name": "forest" }
            }),
        );

        transport.insert_json(
            &format!("{API_BASE}/pokemon/{id}/encounters"),
            serde_json::json!([
                { "location_area": { "name": "viridian-forest-area" }, "version_details": [] }
            ]),
        );
    }

    /// A record built without going through the API
    pub fn record(id: u32, name: &str, types: &[&str]) -> Record {
        Record {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            abilities: vec!["overgrow".to_string()],
            height: 7,
            weight: 69,
            description: format!("{name} description"),
            sprites: SpriteRefs {
                normal: Some(format!("https://sprites.test/{id}.gif")),
                alternate: Some(format!("https://sprites.test/shiny/{id}.gif")),
            },
        }
    }
}
