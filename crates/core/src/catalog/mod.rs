//! Catalog state and remote loading.

/// HTTP retrieval of the remote catalog.
pub mod fetch;
/// Session store holding the catalog, the cart, and the load status.
pub mod store;

pub use fetch::CatalogFetcher;
pub use store::{CatalogStore, LoadStatus, LoadToken, StoreEvent};
