/// Offline application shell
///
/// This module handles:
/// - The fixed asset manifest (manifest.rs)
/// - Installing, activating and serving the named on-disk cache (cache.rs)

pub mod cache;
pub mod manifest;

pub use cache::{InstallReport, ShellCache};
pub use manifest::AssetManifest;
