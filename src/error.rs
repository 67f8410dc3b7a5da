/// Error types for fetching and caching

use std::path::PathBuf;

use thiserror::Error;

/// Failure retrieving or decoding a remote resource
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The request never produced a response
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The body did not match the expected payload shape
    #[error("could not decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure installing, activating or reading the shell cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to populate cache: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid cache index {path}: {source}")]
    Index {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }
}
