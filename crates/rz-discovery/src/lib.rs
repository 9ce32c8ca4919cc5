//! Merchant and AI-service discovery.
//!
//! Everything here is free of I/O except [`catalog::CatalogSource`], which callers
//! implement over whatever transport they have (reqwest natively, `fetch` in the browser).

pub mod catalog;
pub mod geo;
pub mod ranking;
pub mod search;

pub use catalog::{CatalogEntry, CatalogError, CatalogLoader, CatalogSource, LoadState, MountGuard, parse_catalog};
pub use geo::distance_miles;
pub use ranking::{NearbyMemo, Radius, Ranked, rank_by_distance};
pub use search::{QueryDebouncer, filter_entries};
