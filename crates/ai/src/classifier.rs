//! Reorder classifier: training on the fixed example set and single-row inference.

use std::sync::Arc;

use ndarray::Array2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use restock_core::ModelId;

use crate::network::{Activation, Mlp, binary_cross_entropy, correct_predictions};
use crate::optimizer::{Adam, AdamConfig};
use crate::result::{AiError, EpochMetrics, TrainingReport};

/// One labeled training example: `(stock, avg_sales, lead_time) -> label`.
pub type Example = ([f64; 3], f64);

/// The hardcoded training set (label 1 = should reorder).
pub const TRAINING_SET: [Example; 4] = [
    ([20.0, 50.0, 3.0], 0.0),
    ([5.0, 30.0, 5.0], 1.0),
    ([15.0, 40.0, 4.0], 0.0),
    ([8.0, 60.0, 2.0], 1.0),
];

const INPUTS: usize = 3;

/// Shared, read-only handle to a trained model.
pub type ClassifierHandle = Arc<ReorderModel>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub hidden_units: usize,
    /// Hidden nonlinearity. `Relu` by default; `Tanh` is the saturating variant.
    pub activation: Activation,
    pub shuffle: bool,
    pub optimizer: AdamConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            batch_size: 32,
            hidden_units: 8,
            activation: Activation::Relu,
            shuffle: true,
            optimizer: AdamConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    fn validate(&self) -> Result<(), AiError> {
        if self.epochs == 0 {
            return Err(AiError::InvalidInput("epochs must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(AiError::InvalidInput("batch_size must be > 0".to_string()));
        }
        if self.hidden_units == 0 {
            return Err(AiError::InvalidInput("hidden_units must be > 0".to_string()));
        }
        let lr = self.optimizer.learning_rate;
        if !(lr.is_finite() && lr > 0.0) {
            return Err(AiError::InvalidInput(
                "learning_rate must be a finite positive number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trainer for the reorder model.
#[derive(Debug, Clone)]
pub struct ReorderClassifier {
    config: TrainingConfig,
    examples: Vec<Example>,
}

impl Default for ReorderClassifier {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

impl ReorderClassifier {
    /// Trainer over the fixed [`TRAINING_SET`].
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            examples: TRAINING_SET.to_vec(),
        }
    }

    pub fn with_examples(mut self, examples: Vec<Example>) -> Self {
        self.examples = examples;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fit a fresh network. Initialization and shuffling draw from `rng`.
    pub fn train<R: Rng>(&self, rng: &mut R) -> Result<ReorderModel, AiError> {
        self.config.validate()?;
        validate_examples(&self.examples)?;

        let cfg = &self.config;
        let mut network = Mlp::init(INPUTS, cfg.hidden_units, cfg.activation, rng);
        let mut adam = Adam::new(cfg.optimizer, network.params());
        let mut order: Vec<usize> = (0..self.examples.len()).collect();
        let mut history = Vec::with_capacity(cfg.epochs);

        info!(
            epochs = cfg.epochs,
            examples = self.examples.len(),
            hidden = cfg.hidden_units,
            "training reorder classifier"
        );

        for epoch in 1..=cfg.epochs {
            if cfg.shuffle {
                order.shuffle(rng);
            }

            let mut loss_sum = 0.0;
            let mut correct = 0usize;
            for batch in order.chunks(cfg.batch_size) {
                let (x, y) = batch_tensors(&self.examples, batch);
                let pass = network.forward(&x);
                loss_sum += binary_cross_entropy(&pass.output, &y) * batch.len() as f64;
                correct += correct_predictions(&pass.output, &y);

                let grads = network.backward(&x, &y, &pass);
                adam.step(network.params_mut(), &grads);
            }

            let n = self.examples.len() as f64;
            let metrics = EpochMetrics {
                epoch,
                loss: loss_sum / n,
                accuracy: correct as f64 / n,
            };

            if !metrics.loss.is_finite() || !network.params().is_finite() {
                return Err(AiError::TrainingFailed(format!(
                    "numeric divergence at epoch {epoch}"
                )));
            }

            debug!(epoch, loss = metrics.loss, accuracy = metrics.accuracy, "epoch finished");
            history.push(metrics);
        }

        let report = TrainingReport::from_history(history);
        let model = ReorderModel {
            id: ModelId::new(),
            network,
            report,
        };

        info!(
            model = %model.id,
            loss = model.report.final_loss,
            accuracy = model.report.final_accuracy,
            "reorder classifier trained"
        );

        Ok(model)
    }
}

fn validate_examples(examples: &[Example]) -> Result<(), AiError> {
    if examples.is_empty() {
        return Err(AiError::TrainingFailed("training set is empty".to_string()));
    }
    for (i, (x, label)) in examples.iter().enumerate() {
        if x.iter().any(|v| !v.is_finite()) {
            return Err(AiError::TrainingFailed(format!(
                "example {i} has non-finite features"
            )));
        }
        if *label != 0.0 && *label != 1.0 {
            return Err(AiError::TrainingFailed(format!(
                "example {i} has label {label}, expected 0 or 1"
            )));
        }
    }
    Ok(())
}

/// Batch input/label matrices; dropped when the batch step returns.
fn batch_tensors(examples: &[Example], batch: &[usize]) -> (Array2<f64>, Array2<f64>) {
    let x = Array2::from_shape_fn((batch.len(), INPUTS), |(r, c)| examples[batch[r]].0[c]);
    let y = Array2::from_shape_fn((batch.len(), 1), |(r, _)| examples[batch[r]].1);
    (x, y)
}

/// A trained reorder model. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderModel {
    id: ModelId,
    network: Mlp,
    report: TrainingReport,
}

impl ReorderModel {
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn network(&self) -> &Mlp {
        &self.network
    }

    /// One forward pass on a single feature vector; the result is in `[0, 1]`.
    pub fn predict(&self, features: [f64; 3]) -> Result<f64, AiError> {
        self.network.predict_one(features)
    }

    pub fn into_handle(self) -> ClassifierHandle {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn trains_for_the_configured_number_of_epochs() {
        let mut rng = StdRng::seed_from_u64(42);
        let model = ReorderClassifier::default().train(&mut rng).unwrap();

        let report = model.report();
        assert_eq!(report.epochs, 200);
        assert_eq!(report.history.len(), 200);
        assert!(report.final_loss.is_finite());
        assert!((0.0..=1.0).contains(&report.final_accuracy));
        assert_eq!(model.network().hidden(), 8);
        assert_eq!(model.network().activation(), Activation::Relu);
    }

    #[test]
    fn predicts_a_probability_for_a_reorder_example() {
        let mut rng = StdRng::seed_from_u64(3);
        let model = ReorderClassifier::default().train(&mut rng).unwrap();
        let score = model.predict([5.0, 30.0, 5.0]).unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn same_seed_same_model() {
        let a = ReorderClassifier::default()
            .train(&mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = ReorderClassifier::default()
            .train(&mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a.network(), b.network());
        assert_eq!(a.report(), b.report());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn tanh_variant_learns_a_scaled_version_of_the_task() {
        // Scaled inputs keep tanh out of saturation; 4 separable points must be fit.
        let examples = TRAINING_SET
            .iter()
            .map(|(x, y)| ([x[0] / 100.0, x[1] / 100.0, x[2] / 10.0], *y))
            .collect();
        let mut cfg = TrainingConfig::default()
            .with_epochs(2000)
            .with_activation(Activation::Tanh);
        cfg.optimizer.learning_rate = 0.05;
        let model = ReorderClassifier::new(cfg)
            .with_examples(examples)
            .train(&mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(model.report().final_accuracy, 1.0);
    }

    #[test]
    fn malformed_training_data_is_a_training_error() {
        let mut rng = StdRng::seed_from_u64(0);

        let err = ReorderClassifier::default()
            .with_examples(Vec::new())
            .train(&mut rng)
            .unwrap_err();
        assert!(matches!(err, AiError::TrainingFailed(_)));

        let err = ReorderClassifier::default()
            .with_examples(vec![([1.0, f64::INFINITY, 1.0], 1.0)])
            .train(&mut rng)
            .unwrap_err();
        assert!(matches!(err, AiError::TrainingFailed(_)));

        let err = ReorderClassifier::default()
            .with_examples(vec![([1.0, 2.0, 3.0], 0.7)])
            .train(&mut rng)
            .unwrap_err();
        assert!(matches!(err, AiError::TrainingFailed(_)));
    }

    #[test]
    fn invalid_config_is_rejected_before_training() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = ReorderClassifier::new(TrainingConfig::default().with_epochs(0))
            .train(&mut rng)
            .unwrap_err();
        assert!(matches!(err, AiError::InvalidInput(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        })]

        /// Property: whatever the seed, scores for in-range inputs stay in [0, 1].
        #[test]
        fn scores_are_probabilities(
            seed in any::<u64>(),
            stock in 5u32..=84,
            sales in 5u32..=64,
            lead in 1u32..=10,
        ) {
            let model = ReorderClassifier::default()
                .train(&mut StdRng::seed_from_u64(seed))
                .unwrap();
            let score = model.predict([stock as f64, sales as f64, lead as f64]).unwrap();
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
