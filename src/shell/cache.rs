/// Durable, named, cache-first asset store.
///
/// Layout under the cache root:
///
/// ```text
/// <root>/ACTIVE.json            { "name": ..., "activated_at": ... }
/// <root>/<cache-name>/index.json  url -> file
/// <root>/<cache-name>/asset-0000
/// ```
///
/// A cache is only ever populated in a staging directory and moved into place
/// once every asset has been downloaded. Caches whose name is not the active
/// one are orphaned: they stay on disk and are never read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use super::manifest::AssetManifest;
use crate::api::transport::Transport;
use crate::error::{CacheError, FetchError};

const INDEX_FILE: &str = "index.json";
const ACTIVE_FILE: &str = "ACTIVE.json";
const STAGING_PREFIX: &str = ".staging-";

#[derive(Serialize, Deserialize, Debug, Default)]
struct CacheIndex {
    /// url -> file name inside the cache directory
    entries: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ActiveCache {
    name: String,
    activated_at: DateTime<Utc>,
}

/// Outcome of bringing a manifest online
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    pub assets: usize,
    pub bytes: usize,
    /// False when the named cache was already on disk
    pub downloaded: bool,
}

pub struct ShellCache {
    root: PathBuf,
    transport: Arc<dyn Transport>,
    /// Active cache name and its index, loaded lazily from ACTIVE.json
    active: RwLock<Option<(String, Arc<CacheIndex>)>>,
}

impl ShellCache {
    pub fn new(root: impl Into<PathBuf>, transport: Arc<dyn Transport>) -> Self {
        Self {
            root: root.into(),
            transport,
            active: RwLock::new(None),
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Install the manifest unless a cache of that name already exists, then
    /// activate it straight away
    pub async fn ensure(&self, manifest: &AssetManifest) -> Result<InstallReport, CacheError> {
        let report = if self.is_installed(&manifest.cache_name).await {
            debug!(cache = %manifest.cache_name, "shell cache already installed");
            let index = self.load_index(&manifest.cache_name).await?;
            InstallReport {
                cache_name: manifest.cache_name.clone(),
                assets: index.entries.len(),
                bytes: 0,
                downloaded: false,
            }
        } else {
            self.install(manifest).await?
        };

        self.activate(&manifest.cache_name).await?;

        match self.cache_names().await {
            Ok(names) => {
                let orphaned: Vec<String> =
                    names.into_iter().filter(|n| *n != manifest.cache_name).collect();
                if !orphaned.is_empty() {
                    debug!(?orphaned, "orphaned shell caches left on disk");
                }
            }
            Err(e) => debug!(error = %e, "could not list shell caches"),
        }

        Ok(report)
    }

    /// Download every asset into a fresh cache. All-or-nothing: on failure the
    /// staging directory is dropped and an existing cache of the same name is
    /// left as it was.
    pub async fn install(&self, manifest: &AssetManifest) -> Result<InstallReport, CacheError> {
        let staging = self.root.join(format!("{STAGING_PREFIX}{}", manifest.cache_name));

        if fs::metadata(&staging).await.is_ok() {
            fs::remove_dir_all(&staging).await.map_err(CacheError::io(&staging))?;
        }
        fs::create_dir_all(&staging).await.map_err(CacheError::io(&staging))?;

        let bytes = match self.populate(&staging, manifest).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(cache = %manifest.cache_name, error = %e, "shell install failed");
                if let Err(cleanup) = fs::remove_dir_all(&staging).await {
                    debug!(error = %cleanup, "could not remove staging directory");
                }
                return Err(e);
            }
        };

        let target = self.cache_dir(&manifest.cache_name);
        if fs::metadata(&target).await.is_ok() {
            fs::remove_dir_all(&target).await.map_err(CacheError::io(&target))?;
        }
        fs::rename(&staging, &target).await.map_err(CacheError::io(&target))?;

        info!(cache = %manifest.cache_name, assets = manifest.assets.len(), bytes, "shell cache installed");

        Ok(InstallReport {
            cache_name: manifest.cache_name.clone(),
            assets: manifest.assets.len(),
            bytes,
            downloaded: true,
        })
    }

    async fn populate(&self, dir: &Path, manifest: &AssetManifest) -> Result<usize, CacheError> {
        let mut index = CacheIndex::default();
        let mut bytes = 0;

        for (i, url) in manifest.assets.iter().enumerate() {
            let body = self.transport.get(url).await?;
            let file = format!("asset-{i:04}");
            let path = dir.join(&file);
            fs::write(&path, &body).await.map_err(CacheError::io(&path))?;

            bytes += body.len();
            index.entries.insert(url.clone(), file);
        }

        // Written last: a directory without an index is never treated as installed
        let path = dir.join(INDEX_FILE);
        let json = serde_json::to_vec_pretty(&index).map_err(|source| CacheError::Index {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).await.map_err(CacheError::io(&path))?;

        Ok(bytes)
    }

    /// Make `name` the cache every subsequent `fetch` consults
    pub async fn activate(&self, name: &str) -> Result<(), CacheError> {
        let index = self.load_index(name).await?;

        let path = self.root.join(ACTIVE_FILE);
        let active = ActiveCache {
            name: name.to_string(),
            activated_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&active).map_err(|source| CacheError::Index {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).await.map_err(CacheError::io(&path))?;

        if let Ok(mut slot) = self.active.write() {
            *slot = Some((name.to_string(), Arc::new(index)));
        }

        info!(cache = name, "shell cache activated");
        Ok(())
    }

    /// Name of the active cache, if any
    #[cfg(test)]
    pub async fn active(&self) -> Option<String> {
        self.active_index().await.map(|(name, _)| name)
    }

    async fn active_index(&self) -> Option<(String, Arc<CacheIndex>)> {
        if let Ok(slot) = self.active.read() {
            if let Some((name, index)) = slot.as_ref() {
                return Some((name.clone(), index.clone()));
            }
        }

        // Nothing activated in this process yet; pick up a previous run's choice
        let path = self.root.join(ACTIVE_FILE);
        let raw = fs::read(&path).await.ok()?;
        let active: ActiveCache = serde_json::from_slice(&raw).ok()?;
        let index = Arc::new(self.load_index(&active.name).await.ok()?);

        // An activation may have landed while the disk read was pending; it wins
        let Ok(mut slot) = self.active.write() else {
            return Some((active.name, index));
        };
        match slot.as_ref() {
            Some((name, current)) => Some((name.clone(), current.clone())),
            None => {
                *slot = Some((active.name.clone(), index.clone()));
                Some((active.name, index))
            }
        }
    }

    async fn is_installed(&self, name: &str) -> bool {
        fs::metadata(self.cache_dir(name).join(INDEX_FILE)).await.is_ok()
    }

    async fn load_index(&self, name: &str) -> Result<CacheIndex, CacheError> {
        let path = self.cache_dir(name).join(INDEX_FILE);
        let raw = fs::read(&path).await.map_err(CacheError::io(&path))?;
        serde_json::from_slice(&raw).map_err(|source| CacheError::Index { path, source })
    }

    /// Read `url` from the active cache only
    pub async fn lookup(&self, url: &str) -> Option<Vec<u8>> {
        let (name, index) = self.active_index().await?;
        let file = index.entries.get(url)?;
        fs::read(self.cache_dir(&name).join(file)).await.ok()
    }

    /// Cache-first: serve from the active cache, else go to the network.
    /// Network responses are not stored.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(body) = self.lookup(url).await {
            return Ok(body);
        }
        self.transport.get(url).await
    }

    /// Every named cache on disk, including orphaned ones
    pub async fn cache_names(&self) -> Result<Vec<String>, CacheError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await.map_err(CacheError::io(&self.root))?;

        while let Some(entry) = entries.next_entry().await.map_err(CacheError::io(&self.root))? {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().to_string();
            if is_dir && !name.starts_with(STAGING_PREFIX) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

impl std::fmt::Debug for ShellCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellCache")
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;

    const ICON: &str = "https://icons.test/fire.svg";
    const OTHER_ICON: &str = "https://icons.test/water.svg";

    fn setup() -> (tempfile::TempDir, Arc<FakeTransport>, ShellCache) {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = Arc::new(FakeTransport::new());
        let cache = ShellCache::new(dir.path().join("shell"), transport.clone());
        (dir, transport, cache)
    }

    fn manifest(name: &str) -> AssetManifest {
        AssetManifest::new(name, vec![ICON.to_string(), OTHER_ICON.to_string()])
    }

    #[tokio::test]
    async fn install_populates_every_asset_before_activation() {
        let (_dir, transport, cache) = setup();
        transport.insert(ICON, b"<svg>fire</svg>".to_vec());
        transport.insert(OTHER_ICON, b"<svg>water</svg>".to_vec());

        let report = cache.ensure(&manifest("shell-v1")).await.expect("ensure");
        assert!(report.downloaded);
        assert_eq!(report.assets, 2);

        assert_eq!(cache.active().await.as_deref(), Some("shell-v1"));
        assert_eq!(cache.lookup(ICON).await.as_deref(), Some(&b"<svg>fire</svg>"[..]));
        assert_eq!(cache.lookup(OTHER_ICON).await.as_deref(), Some(&b"<svg>water</svg>"[..]));
    }

    #[tokio::test]
    async fn fetch_is_cache_first() {
        let (_dir, transport, cache) = setup();
        transport.insert(ICON, b"cached".to_vec());
        transport.insert(OTHER_ICON, b"cached too".to_vec());
        cache.ensure(&manifest("shell-v1")).await.expect("ensure");

        // Network is now down for the cached asset; it must still be served
        transport.inject_failure(ICON);
        let before = transport.request_count(ICON);
        assert_eq!(cache.fetch(ICON).await.expect("fetch"), b"cached".to_vec());
        assert_eq!(transport.request_count(ICON), before);
    }

    #[tokio::test]
    async fn uncached_requests_fall_through_without_storing() {
        let (_dir, transport, cache) = setup();
        transport.insert(ICON, b"a".to_vec());
        transport.insert(OTHER_ICON, b"b".to_vec());
        cache.ensure(&manifest("shell-v1")).await.expect("ensure");

        let sprite = "https://sprites.test/25.gif";
        transport.insert(sprite, b"gif".to_vec());

        assert_eq!(cache.fetch(sprite).await.expect("fetch"), b"gif".to_vec());
        assert_eq!(cache.fetch(sprite).await.expect("fetch"), b"gif".to_vec());
        assert_eq!(transport.request_count(sprite), 2);
        assert!(cache.lookup(sprite).await.is_none());
    }

    #[tokio::test]
    async fn renamed_cache_orphans_the_old_one() {
        let (_dir, transport, cache) = setup();
        transport.insert(ICON, b"old".to_vec());
        transport.insert(OTHER_ICON, b"old".to_vec());
        cache.ensure(&manifest("shell-v1")).await.expect("v1");

        transport.insert(ICON, b"new".to_vec());
        transport.insert(OTHER_ICON, b"new".to_vec());
        let report = cache.ensure(&manifest("shell-v2")).await.expect("v2");
        assert!(report.downloaded);

        assert_eq!(cache.active().await.as_deref(), Some("shell-v2"));
        assert_eq!(cache.fetch(ICON).await.expect("fetch"), b"new".to_vec());
        assert_eq!(cache.cache_names().await.expect("names"), vec!["shell-v1", "shell-v2"]);

        // The orphan is still on disk, untouched
        let orphan = cache.root().join("shell-v1").join("asset-0000");
        assert_eq!(std::fs::read(orphan).expect("orphan"), b"old".to_vec());
    }

    #[tokio::test]
    async fn existing_cache_is_not_downloaded_again() {
        let (_dir, transport, cache) = setup();
        transport.insert(ICON, b"a".to_vec());
        transport.insert(OTHER_ICON, b"b".to_vec());
        cache.ensure(&manifest("shell-v1")).await.expect("first");

        let report = cache.ensure(&manifest("shell-v1")).await.expect("second");
        assert!(!report.downloaded);
        assert_eq!(report.assets, 2);
        assert_eq!(transport.request_count(ICON), 1);
    }

    #[tokio::test]
    async fn failed_install_leaves_active_cache_alone() {
        let (_dir, transport, cache) = setup();
        transport.insert(ICON, b"v1".to_vec());
        transport.insert(OTHER_ICON, b"v1".to_vec());
        cache.ensure(&manifest("shell-v1")).await.expect("v1");

        transport.inject_failure(OTHER_ICON);
        let result = cache.ensure(&manifest("shell-v2")).await;
        assert!(matches!(result, Err(CacheError::Fetch(_))));

        assert_eq!(cache.active().await.as_deref(), Some("shell-v1"));
        assert_eq!(cache.cache_names().await.expect("names"), vec!["shell-v1"]);
        assert_eq!(cache.fetch(ICON).await.expect("fetch"), b"v1".to_vec());
    }

    #[tokio::test]
    async fn activation_survives_a_restart() {
        let (dir, transport, cache) = setup();
        transport.insert(ICON, b"kept".to_vec());
        transport.insert(OTHER_ICON, b"kept".to_vec());
        cache.ensure(&manifest("shell-v1")).await.expect("ensure");
        drop(cache);

        let reopened = ShellCache::new(dir.path().join("shell"), transport.clone());
        assert_eq!(reopened.active().await.as_deref(), Some("shell-v1"));
        assert_eq!(reopened.lookup(ICON).await.as_deref(), Some(&b"kept"[..]));
    }

    #[tokio::test]
    async fn activation_beats_a_concurrent_lazy_load() {
        let (dir, transport, cache) = setup();
        transport.insert(ICON, b"old".to_vec());
        transport.insert(OTHER_ICON, b"old".to_vec());
        cache.ensure(&manifest("shell-v1")).await.expect("v1");

        transport.insert(ICON, b"new".to_vec());
        transport.insert(OTHER_ICON, b"new".to_vec());
        cache.install(&manifest("shell-v2")).await.expect("install v2");
        drop(cache);

        for _ in 0..50 {
            std::fs::write(
                dir.path().join("shell").join(ACTIVE_FILE),
                br#"{ "name": "shell-v1", "activated_at": "2024-01-01T00:00:00Z" }"#,
            )
            .expect("reset active");

            let reopened = ShellCache::new(dir.path().join("shell"), transport.clone());
            let (_, activated) = tokio::join!(reopened.lookup(ICON), reopened.activate("shell-v2"));
            activated.expect("activate v2");

            assert_eq!(reopened.active().await.as_deref(), Some("shell-v2"));
            assert_eq!(reopened.lookup(ICON).await.as_deref(), Some(&b"new"[..]));
        }
    }

    #[tokio::test]
    async fn activating_a_missing_cache_fails() {
        let (_dir, _transport, cache) = setup();
        assert!(matches!(cache.activate("nope").await, Err(CacheError::Io { .. })));
        assert!(cache.active().await.is_none());
    }
}
