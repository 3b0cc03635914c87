//! HVAC Directory
//!
//! Data access and web presentation for a directory of HVAC contractors,
//! browsable by state, city and individual listing.
//!
//! - `regions`: compiled-in registry of US states and their slugs
//! - `models`: `Business` rows and the derived `StateInfo` / `CityInfo` views
//! - `store`: the `BusinessStore` capability surface and the in-memory sample store
//! - `query_engine`: DataFusion-backed store over a Parquet or NDJSON table
//! - `directory`: the query functions every page is built from
//! - `seo`: page metadata, JSON-LD and the sitemap
//! - `api_server` / `web`: axum router, JSON API and Askama pages
//!
//! The store is chosen once from `config::AppConfig` and injected into
//! `Directory`; nothing downstream knows which one is in use.

pub mod config;
pub mod directory;
pub mod models;
pub mod regions;
pub mod seo;
pub mod store;

#[cfg(feature = "api")]
pub mod query_engine;

#[cfg(feature = "api")]
pub mod api_server;

#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use config::{AppConfig, DataSourceConfig};
pub use directory::{Directory, SEARCH_LIMIT};
pub use models::{Business, CityInfo, StateInfo};
pub use store::{BusinessStore, DataSourceError, SampleStore};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};

#[cfg(feature = "api")]
pub use query_engine::TableStore;
