use chrono::{DateTime, Utc};
use serde::Serialize;

use restock_core::{AggregateRoot, ModelId, SessionId};
use restock_inventory::Prediction;

use crate::actions::{Action, allowed_actions};
use crate::session::Session;
use crate::state::{SessionState, StatusTone};

/// Training outcome summary for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub id: ModelId,
    pub epochs: usize,
    pub final_loss: f64,
    pub final_accuracy: f64,
}

/// Everything the presentation needs to render the status badge and controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub session_id: SessionId,
    pub state: SessionState,
    pub message: &'static str,
    pub tone: StatusTone,
    pub allowed_actions: Vec<Action>,
    pub catalog_size: usize,
    pub reorder_count: usize,
    pub sufficient_count: usize,
    pub model: Option<ModelSummary>,
    pub since: DateTime<Utc>,
    pub version: u64,
}

impl StatusSnapshot {
    pub fn of(session: &Session) -> Self {
        let state = session.state();
        let catalog = session.catalog();
        Self {
            session_id: *session.id(),
            state,
            message: state.message(),
            tone: state.tone(),
            allowed_actions: allowed_actions(state).to_vec(),
            catalog_size: catalog.len(),
            reorder_count: catalog.count(Prediction::Reorder),
            sufficient_count: catalog.count(Prediction::Sufficient),
            model: session.model().map(|m| {
                let report = m.report();
                ModelSummary {
                    id: m.id(),
                    epochs: report.epochs,
                    final_loss: report.final_loss,
                    final_accuracy: report.final_accuracy,
                }
            }),
            since: session.since(),
            version: session.version(),
        }
    }
}
