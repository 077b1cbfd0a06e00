//! Tiny dense network: `inputs -> hidden (activation) -> 1 (sigmoid)`.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::result::AiError;

/// Hidden-layer nonlinearity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
}

impl Activation {
    fn apply(self, z: f64) -> f64 {
        match self {
            Activation::Relu => z.max(0.0),
            Activation::Tanh => z.tanh(),
        }
    }

    /// Derivative expressed through the pre-activation `z` and output `a`.
    fn derivative(self, z: f64, a: f64) -> f64 {
        match self {
            Activation::Relu => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Tanh => 1.0 - a * a,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Trainable parameters (also used as the gradient container).
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// `inputs x hidden`
    pub w1: Array2<f64>,
    pub b1: Array1<f64>,
    /// `hidden x 1`
    pub w2: Array2<f64>,
    pub b2: Array1<f64>,
}

impl Params {
    pub fn zeros_like(other: &Params) -> Self {
        Self {
            w1: Array2::zeros(other.w1.raw_dim()),
            b1: Array1::zeros(other.b1.raw_dim()),
            w2: Array2::zeros(other.w2.raw_dim()),
            b2: Array1::zeros(other.b2.raw_dim()),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.w1
            .iter()
            .chain(self.b1.iter())
            .chain(self.w2.iter())
            .chain(self.b2.iter())
            .all(|v| v.is_finite())
    }
}

/// Intermediate values of a batched forward pass, kept for backprop.
#[derive(Debug)]
pub struct ForwardPass {
    z1: Array2<f64>,
    a1: Array2<f64>,
    /// Sigmoid outputs, `batch x 1`.
    pub output: Array2<f64>,
}

/// One-hidden-layer perceptron with a single logistic output.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    params: Params,
    activation: Activation,
}

impl Mlp {
    /// Glorot-uniform weights, zero biases.
    pub fn init<R: Rng>(inputs: usize, hidden: usize, activation: Activation, rng: &mut R) -> Self {
        let params = Params {
            w1: glorot_uniform(inputs, hidden, rng),
            b1: Array1::zeros(hidden),
            w2: glorot_uniform(hidden, 1, rng),
            b2: Array1::zeros(1),
        };
        Self { params, activation }
    }

    pub fn from_params(params: Params, activation: Activation) -> Self {
        Self { params, activation }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn inputs(&self) -> usize {
        self.params.w1.nrows()
    }

    pub fn hidden(&self) -> usize {
        self.params.w1.ncols()
    }

    pub fn forward(&self, x: &Array2<f64>) -> ForwardPass {
        let act = self.activation;
        let z1 = x.dot(&self.params.w1) + &self.params.b1;
        let a1 = z1.mapv(|z| act.apply(z));
        let z2 = a1.dot(&self.params.w2) + &self.params.b2;
        let output = z2.mapv(sigmoid);
        ForwardPass { z1, a1, output }
    }

    /// Single-row inference. The input and hidden buffers live only for this call.
    pub fn predict_one(&self, features: [f64; 3]) -> Result<f64, AiError> {
        if self.inputs() != features.len() {
            return Err(AiError::InvalidInput(format!(
                "expected {} features, got {}",
                self.inputs(),
                features.len()
            )));
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(AiError::InvalidInput("features must be finite".to_string()));
        }

        let x = Array1::from(features.to_vec());
        let act = self.activation;
        let hidden = (x.dot(&self.params.w1) + &self.params.b1).mapv(|z| act.apply(z));
        let z2 = hidden.dot(&self.params.w2) + &self.params.b2;
        let score = sigmoid(z2[0]);

        if !score.is_finite() {
            return Err(AiError::InferenceFailed("non-finite output".to_string()));
        }
        Ok(score)
    }

    /// Gradients of mean binary cross-entropy w.r.t. every parameter.
    ///
    /// `y` is `batch x 1` with labels in {0, 1}.
    pub fn backward(&self, x: &Array2<f64>, y: &Array2<f64>, pass: &ForwardPass) -> Params {
        let n = x.nrows() as f64;
        let act = self.activation;

        // d(BCE)/d(z2) for a sigmoid output collapses to (p - y).
        let dz2 = (&pass.output - y) / n;
        let dw2 = pass.a1.t().dot(&dz2);
        let db2 = dz2.sum_axis(Axis(0));

        let da1 = dz2.dot(&self.params.w2.t());
        let mut dz1 = da1;
        ndarray::Zip::from(&mut dz1)
            .and(&pass.z1)
            .and(&pass.a1)
            .for_each(|d, &z, &a| *d *= act.derivative(z, a));
        let dw1 = x.t().dot(&dz1);
        let db1 = dz1.sum_axis(Axis(0));

        Params {
            w1: dw1,
            b1: db1,
            w2: dw2,
            b2: db2,
        }
    }
}

fn glorot_uniform<R: Rng>(fan_in: usize, fan_out: usize, rng: &mut R) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((fan_in, fan_out), |_| rng.gen_range(-limit..limit))
}

/// Mean binary cross-entropy with outputs clipped away from 0 and 1.
pub fn binary_cross_entropy(output: &Array2<f64>, y: &Array2<f64>) -> f64 {
    const EPS: f64 = 1e-7;
    let n = output.len().max(1) as f64;
    let total: f64 = output
        .iter()
        .zip(y.iter())
        .map(|(&p, &t)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum();
    total / n
}

/// Number of outputs whose 0.5-threshold matches the label.
pub fn correct_predictions(output: &Array2<f64>, y: &Array2<f64>) -> usize {
    output
        .iter()
        .zip(y.iter())
        .filter(|&(&p, &t)| (p > 0.5) == (t > 0.5))
        .count()
}
