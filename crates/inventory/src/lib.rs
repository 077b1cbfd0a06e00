//! Inventory domain module (synthetic catalog).
//!
//! This crate contains the inventory record model and the synthetic catalog
//! generator, implemented purely as domain logic (no IO, no HTTP, no storage).
//! Randomness is always injected by the caller.

pub mod catalog;
pub mod generator;
pub mod record;

pub use catalog::{CATALOG_SIZE, Catalog, CatalogError};
pub use generator::{CatalogGenerator, GAME_STORE_NAMES, NamePool};
pub use record::{
    AVG_SALES_RANGE, FeatureVector, InventoryRecord, LEAD_TIME_RANGE, Prediction, REORDER_THRESHOLD,
    RecordId, STOCK_RANGE, round_score,
};
