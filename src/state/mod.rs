/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Filter/search and the tag index (filter.rs)
/// - The catalog: current collection, filter state, detail view (catalog.rs)

pub mod catalog;
pub mod data;
pub mod filter;

pub use catalog::{Catalog, DetailState, DetailTicket, LoadStep, LoadTicket};
