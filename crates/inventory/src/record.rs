use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Units currently on hand.
pub const STOCK_RANGE: RangeInclusive<u32> = 5..=84;

/// Average units sold per week.
pub const AVG_SALES_RANGE: RangeInclusive<u32> = 5..=64;

/// Supplier lead time in days.
pub const LEAD_TIME_RANGE: RangeInclusive<u32> = 1..=10;

/// Scores strictly above this threshold are labeled `Reorder`.
pub const REORDER_THRESHOLD: f64 = 0.5;

/// Catalog-local record identifier (1-based, unique within a catalog).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl RecordId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classifier input: `(stock, avg_sales, lead_time)` in that order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    pub stock: u32,
    pub avg_sales: u32,
    pub lead_time: u32,
}

impl FeatureVector {
    pub fn new(stock: u32, avg_sales: u32, lead_time: u32) -> Self {
        Self {
            stock,
            avg_sales,
            lead_time,
        }
    }

    /// Numeric form consumed by the classifier.
    pub fn to_array(&self) -> [f64; 3] {
        [
            f64::from(self.stock),
            f64::from(self.avg_sales),
            f64::from(self.lead_time),
        ]
    }
}

/// Reorder label of a record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prediction {
    Pending,
    Reorder,
    Sufficient,
}

impl Prediction {
    /// Map a classifier score to a label (`score > 0.5` means reorder).
    pub fn from_score(score: f64) -> Self {
        if score > REORDER_THRESHOLD {
            Prediction::Reorder
        } else {
            Prediction::Sufficient
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Pending => "Pending",
            Prediction::Reorder => "Reorder",
            Prediction::Sufficient => "Sufficient",
        }
    }

    /// Text shown in the dashboard's prediction column.
    pub fn display_label(&self) -> &'static str {
        match self {
            Prediction::Pending => "Waiting...",
            Prediction::Reorder => "Restock Needed",
            Prediction::Sufficient => "Sufficient",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Prediction::Pending)
    }
}

/// Round a score to 2 decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// One synthetic catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: RecordId,
    pub name: String,
    pub stock: u32,
    pub avg_sales: u32,
    pub lead_time: u32,
    pub features: FeatureVector,
    pub prediction: Prediction,
    pub score: Option<f64>,
    /// Index of the base item (from the external source) that backed this row.
    pub source_index: usize,
}

impl InventoryRecord {
    /// Build a pending record; `features` is derived from the numeric fields.
    pub fn pending(
        id: RecordId,
        name: impl Into<String>,
        stock: u32,
        avg_sales: u32,
        lead_time: u32,
        source_index: usize,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            stock,
            avg_sales,
            lead_time,
            features: FeatureVector::new(stock, avg_sales, lead_time),
            prediction: Prediction::Pending,
            score: None,
            source_index,
        }
    }

    /// Return a copy labeled from a raw classifier score.
    ///
    /// The label is decided on the raw score; the stored score is rounded.
    pub fn with_score(&self, score: f64) -> Self {
        Self {
            prediction: Prediction::from_score(score),
            score: Some(round_score(score.clamp(0.0, 1.0))),
            ..self.clone()
        }
    }
}
