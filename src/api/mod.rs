/// Remote catalog access
///
/// This module handles:
/// - The network transport seam (transport.rs)
/// - PokeAPI payload shapes (models.rs)
/// - Record and detail retrieval (client.rs)

pub mod client;
pub mod models;
pub mod transport;

pub use client::PokeApi;
pub use transport::{HttpTransport, Transport};
