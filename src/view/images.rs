/// Decoded image handles keyed by locator
///
/// Sprites and type icons are fetched once per locator. A locator that
/// failed stays marked as requested, so there is no automatic retry; the
/// slot simply renders empty. Sprites belong to one collection and are
/// dropped when another generation is selected; type icons are kept.

use std::collections::{HashMap, HashSet};

use iced::widget::{image, svg};

#[derive(Default)]
pub struct ImageStore {
    bitmaps: HashMap<String, image::Handle>,
    vectors: HashMap<String, svg::Handle>,
    requested: HashSet<String>,
}

impl ImageStore {
    /// Mark `url` as requested; true the first time only
    pub fn claim(&mut self, url: &str) -> bool {
        self.requested.insert(url.to_string())
    }

    /// Store decoded bytes; results for locators no longer claimed are dropped
    pub fn insert(&mut self, url: String, bytes: Vec<u8>) {
        if !self.requested.contains(&url) {
            return;
        }
        if is_vector(&url) {
            self.vectors.insert(url, svg::Handle::from_memory(bytes));
        } else {
            self.bitmaps.insert(url, image::Handle::from_bytes(bytes));
        }
    }

    /// Forget every sprite of the previous collection, including in-flight
    /// requests
    pub fn clear_bitmaps(&mut self) {
        self.bitmaps.clear();
        self.requested.retain(|url| is_vector(url));
    }

    pub fn bitmap(&self, url: &str) -> Option<&image::Handle> {
        self.bitmaps.get(url)
    }

    pub fn vector(&self, url: &str) -> Option<&svg::Handle> {
        self.vectors.get(url)
    }
}

fn is_vector(url: &str) -> bool {
    url.ends_with(".svg")
}
