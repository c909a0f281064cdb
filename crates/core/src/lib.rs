#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Velo storefront.
//!
//! This crate hosts the catalog data model, configuration handling,
//! the remote catalog fetch, and the session store consumed by the
//! terminal UI and any future frontends.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use catalog::{CatalogFetcher, CatalogStore, LoadStatus, LoadToken, StoreEvent};
pub use config::AppConfig;
pub use error::CatalogError;
pub use models::CatalogItem;
