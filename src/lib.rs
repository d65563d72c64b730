//! # eldendata
//!
//! Loads Elden Ring CSV exports into a sled-backed document store and serves them over a REST
//! query layer.
//!
//! The core is the field normalizer in [`normalize`]: composite columns arrive as Python-style
//! literals, JSON strings, lists of `{name, amount}` pairs or abbreviated mappings, and leave as
//! fully keyed canonical objects. Ingestion ([`ingest`]) and the read path
//! ([`service::adapter`]) both run every column through the same tables.

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use context::AppContext;
pub use error::{EldenDataError, EldenDataResult};
pub use store::DocumentStore;
