use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::classifier::{ClassifierHandle, ReorderClassifier, ReorderModel};
use crate::result::AiError;

/// A self-contained unit of AI work that can be shipped to a worker thread.
///
/// Jobs own their inputs; callers provide everything up front so the job can
/// run without touching session state.
pub trait AiJob: Send + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The input the job will run on.
    fn input(&self) -> &Self::Input;

    /// Execute the job. Must not mutate shared state.
    fn run(self) -> Result<Self::Output, AiError>;
}

/// Train a fresh reorder model.
///
/// With `seed: None` the RNG is seeded from OS entropy, so every run starts
/// from different weights.
#[derive(Debug, Clone)]
pub struct TrainingJob {
    classifier: ReorderClassifier,
    seed: Option<u64>,
}

impl TrainingJob {
    pub fn new(classifier: ReorderClassifier) -> Self {
        Self {
            classifier,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl AiJob for TrainingJob {
    type Input = ReorderClassifier;
    type Output = ReorderModel;

    fn name(&self) -> &'static str {
        "ai.reorder.train"
    }

    fn input(&self) -> &Self::Input {
        &self.classifier
    }

    fn run(self) -> Result<ReorderModel, AiError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.classifier.train(&mut rng)
    }
}

/// Score a batch of feature vectors, one forward pass per row, in order.
#[derive(Debug, Clone)]
pub struct ScoringJob {
    model: ClassifierHandle,
    inputs: Vec<[f64; 3]>,
}

impl ScoringJob {
    pub fn new(model: ClassifierHandle, inputs: Vec<[f64; 3]>) -> Self {
        Self { model, inputs }
    }
}

impl AiJob for ScoringJob {
    type Input = Vec<[f64; 3]>;
    type Output = Vec<f64>;

    fn name(&self) -> &'static str {
        "ai.reorder.score"
    }

    fn input(&self) -> &Self::Input {
        &self.inputs
    }

    fn run(self) -> Result<Vec<f64>, AiError> {
        let scores = self
            .inputs
            .iter()
            .map(|features| self.model.predict(*features))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(model = %self.model.id(), rows = scores.len(), "scored feature vectors");
        Ok(scores)
    }
}
