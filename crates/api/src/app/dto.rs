use serde::Serialize;

use restock_ai::EpochMetrics;
use restock_inventory::{Catalog, InventoryRecord, Prediction};
use restock_session::{HistoryEntry, SessionState};

/// One dashboard table row.
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub id: u32,
    pub name: String,
    pub stock: u32,
    pub avg_sales: u32,
    pub lead_time: u32,
    pub prediction: Prediction,
    /// Text for the prediction column.
    pub label: &'static str,
    pub score: Option<f64>,
}

impl From<&InventoryRecord> for RecordView {
    fn from(r: &InventoryRecord) -> Self {
        Self {
            id: r.id.get(),
            name: r.name.clone(),
            stock: r.stock,
            avg_sales: r.avg_sales,
            lead_time: r.lead_time,
            prediction: r.prediction,
            label: r.prediction.display_label(),
            score: r.score,
        }
    }
}

pub fn catalog_to_json(catalog: &Catalog) -> Vec<RecordView> {
    catalog.iter().map(RecordView::from).collect()
}

/// Session transitions plus the current model's per-epoch metrics.
#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub transitions: Vec<HistoryEntry>,
    pub training: Vec<EpochMetrics>,
}

/// Body of a `202 Accepted` answer to a fire-and-forget command.
#[derive(Debug, Serialize)]
pub struct Accepted {
    pub accepted: bool,
    pub state: SessionState,
}
