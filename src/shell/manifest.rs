/// The fixed list of static assets the shell cache pre-populates

use crate::config::{Settings, ALL_TAGS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    /// Acts as the version tag: a new name means a fresh cache
    pub cache_name: String,
    pub assets: Vec<String>,
}

impl AssetManifest {
    pub fn new(cache_name: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            assets,
        }
    }

    /// The application's shell: one icon per type tag
    pub fn from_settings(settings: &Settings) -> Self {
        let assets = ALL_TAGS.iter().map(|tag| settings.type_icon(tag)).collect();
        Self::new(settings.cache_name.clone(), assets)
    }
}
