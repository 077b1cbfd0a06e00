use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{
    AVG_SALES_RANGE, InventoryRecord, LEAD_TIME_RANGE, Prediction, RecordId, STOCK_RANGE,
};

/// Number of records in every generated catalog.
pub const CATALOG_SIZE: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must hold exactly {expected} records, got {actual}")]
    WrongSize { expected: usize, actual: usize },

    #[error("record at position {position} has id {id}, expected {expected}")]
    IdOutOfSequence {
        position: usize,
        id: u32,
        expected: u32,
    },

    #[error("record {id}: {field}={value} is out of range")]
    FieldOutOfRange {
        id: u32,
        field: &'static str,
        value: u32,
    },

    #[error("record {id}: features do not match its stock/sales/lead time fields")]
    FeatureMismatch { id: u32 },

    #[error("name pool cannot be empty")]
    EmptyNamePool,

    #[error("base item list cannot be empty")]
    EmptyBaseList,
}

/// Ordered set of inventory records held by a session.
///
/// A non-empty catalog always satisfies: exactly [`CATALOG_SIZE`] records,
/// ids `1..=100` in order, every numeric field inside its range. Catalogs are
/// replaced wholesale; there is no API for mutating a single record in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<InventoryRecord>,
}

impl Catalog {
    /// The catalog of a session that has not loaded (or failed to load) data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and wrap a full set of records.
    pub fn from_records(records: Vec<InventoryRecord>) -> Result<Self, CatalogError> {
        if records.len() != CATALOG_SIZE {
            return Err(CatalogError::WrongSize {
                expected: CATALOG_SIZE,
                actual: records.len(),
            });
        }

        for (position, r) in records.iter().enumerate() {
            let expected = position as u32 + 1;
            if r.id != RecordId(expected) {
                return Err(CatalogError::IdOutOfSequence {
                    position,
                    id: r.id.get(),
                    expected,
                });
            }
            check_range(r, "stock", r.stock, STOCK_RANGE.contains(&r.stock))?;
            check_range(r, "avg_sales", r.avg_sales, AVG_SALES_RANGE.contains(&r.avg_sales))?;
            check_range(r, "lead_time", r.lead_time, LEAD_TIME_RANGE.contains(&r.lead_time))?;
            if r.features.stock != r.stock
                || r.features.avg_sales != r.avg_sales
                || r.features.lead_time != r.lead_time
            {
                return Err(CatalogError::FeatureMismatch { id: r.id.get() });
            }
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&InventoryRecord> {
        // Ids are dense and 1-based.
        let idx = (id.get() as usize).checked_sub(1)?;
        self.records.get(idx)
    }

    pub fn count(&self, prediction: Prediction) -> usize {
        self.records
            .iter()
            .filter(|r| r.prediction == prediction)
            .count()
    }

    /// True once every record carries a Reorder/Sufficient label.
    pub fn is_fully_labeled(&self) -> bool {
        !self.is_empty() && self.records.iter().all(|r| !r.prediction.is_pending())
    }
}

fn check_range(
    r: &InventoryRecord,
    field: &'static str,
    value: u32,
    ok: bool,
) -> Result<(), CatalogError> {
    if ok {
        Ok(())
    } else {
        Err(CatalogError::FieldOutOfRange {
            id: r.id.get(),
            field,
            value,
        })
    }
}
