use rand::Rng;
use tracing::debug;

use crate::catalog::{CATALOG_SIZE, Catalog, CatalogError};
use crate::record::{AVG_SALES_RANGE, InventoryRecord, LEAD_TIME_RANGE, RecordId, STOCK_RANGE};

/// Product names used for the synthetic catalog (game store theme).
pub const GAME_STORE_NAMES: [&str; 20] = [
    "PlayStation 5 Console",
    "Xbox Series X",
    "Nintendo Switch OLED",
    "RTX 4090 Graphics Card",
    "Logitech G Pro Mouse",
    "Razer BlackWidow Keyboard",
    "HyperX Cloud II Headset",
    "Samsung Odyssey Monitor",
    "Steam Deck 512GB",
    "Elden Ring (PS5)",
    "Cyberpunk 2077 (PC)",
    "DualSense Controller",
    "Xbox Elite Controller",
    "Secretlab Titan Chair",
    "Elgato Stream Deck",
    "Blue Yeti Microphone",
    "Oculus Quest 2",
    "NVMe SSD 2TB",
    "DDR5 RAM 32GB",
    "Gaming Laptop MSI Raider",
];

/// Fixed, non-empty pool of record names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePool {
    names: Vec<String>,
}

impl NamePool {
    pub fn new(names: Vec<String>) -> Result<Self, CatalogError> {
        if names.is_empty() {
            return Err(CatalogError::EmptyNamePool);
        }
        Ok(Self { names })
    }

    pub fn game_store() -> Self {
        Self {
            names: GAME_STORE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `pool[id mod pool_size]`.
    pub fn name_for(&self, id: RecordId) -> &str {
        &self.names[id.get() as usize % self.names.len()]
    }
}

impl Default for NamePool {
    fn default() -> Self {
        Self::game_store()
    }
}

/// Builds 100-record catalogs out of an external base list.
///
/// Only the *count* of base items matters; their content is discarded. The
/// base list is cycled to fill every slot: slot `k` (id `k + 1`) is backed by
/// base item `k mod N`. With the usual 20 base items this is five identical
/// batches of 20.
#[derive(Debug, Clone, Default)]
pub struct CatalogGenerator {
    pool: NamePool,
}

impl CatalogGenerator {
    pub fn new(pool: NamePool) -> Self {
        Self { pool }
    }

    pub fn generate<T, R>(&self, base_items: &[T], rng: &mut R) -> Result<Catalog, CatalogError>
    where
        R: Rng,
    {
        if base_items.is_empty() {
            return Err(CatalogError::EmptyBaseList);
        }

        let base_len = base_items.len();
        let records: Vec<InventoryRecord> = (0..CATALOG_SIZE)
            .map(|slot| {
                let id = RecordId(slot as u32 + 1);
                let stock = rng.gen_range(STOCK_RANGE);
                let avg_sales = rng.gen_range(AVG_SALES_RANGE);
                let lead_time = rng.gen_range(LEAD_TIME_RANGE);
                InventoryRecord::pending(
                    id,
                    self.pool.name_for(id),
                    stock,
                    avg_sales,
                    lead_time,
                    slot % base_len,
                )
            })
            .collect();

        debug!(base_items = base_len, records = records.len(), "generated synthetic catalog");

        Catalog::from_records(records)
    }
}
