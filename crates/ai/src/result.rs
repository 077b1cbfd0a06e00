use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metrics recorded at the end of one training epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Mean binary cross-entropy over the epoch's batches.
    pub loss: f64,
    /// Fraction of examples whose thresholded output matched the label.
    pub accuracy: f64,
}

/// Summary of a finished training run.
///
/// This is an insight for display/logging, not part of the model's behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs: usize,
    pub final_loss: f64,
    pub final_accuracy: f64,
    pub history: Vec<EpochMetrics>,
}

impl TrainingReport {
    pub fn from_history(history: Vec<EpochMetrics>) -> Self {
        let last = history.last().copied();
        Self {
            epochs: history.len(),
            final_loss: last.map(|m| m.loss).unwrap_or(f64::NAN),
            final_accuracy: last.map(|m| m.accuracy).unwrap_or(0.0),
            history,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("training failed: {0}")]
    TrainingFailed(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),
}
