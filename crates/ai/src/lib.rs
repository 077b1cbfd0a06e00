//! `restock-ai`
//!
//! **Responsibility:** the reorder classifier (training + inference).
//!
//! This crate is intentionally **not** part of the inventory model:
//! - It must not depend on inventory records or the session.
//! - It consumes plain `[f64; 3]` feature vectors and returns raw scores.
//! - Mapping scores to labels is the caller's job.

pub mod classifier;
pub mod job;
pub mod network;
pub mod optimizer;
pub mod result;

pub use classifier::{
    ClassifierHandle, Example, ReorderClassifier, ReorderModel, TRAINING_SET, TrainingConfig,
};
pub use job::{AiJob, ScoringJob, TrainingJob};
pub use network::{Activation, Mlp};
pub use optimizer::{Adam, AdamConfig};
pub use result::{AiError, EpochMetrics, TrainingReport};
