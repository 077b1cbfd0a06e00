//! Adam optimizer over [`Params`].

use ndarray::{Array, Dimension, Zip};
use serde::{Deserialize, Serialize};

use crate::network::Params;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

/// Adam state: first/second moment estimates plus the step counter.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    m: Params,
    v: Params,
    t: i32,
}

impl Adam {
    pub fn new(config: AdamConfig, shape_of: &Params) -> Self {
        Self {
            config,
            m: Params::zeros_like(shape_of),
            v: Params::zeros_like(shape_of),
            t: 0,
        }
    }

    pub fn steps(&self) -> i32 {
        self.t
    }

    pub fn step(&mut self, params: &mut Params, grads: &Params) {
        self.t += 1;
        let c = self.config;
        // Bias correction folded into the step size.
        let lr_t = c.learning_rate * (1.0 - c.beta2.powi(self.t)).sqrt() / (1.0 - c.beta1.powi(self.t));

        update(&mut params.w1, &mut self.m.w1, &mut self.v.w1, &grads.w1, lr_t, &c);
        update(&mut params.b1, &mut self.m.b1, &mut self.v.b1, &grads.b1, lr_t, &c);
        update(&mut params.w2, &mut self.m.w2, &mut self.v.w2, &grads.w2, lr_t, &c);
        update(&mut params.b2, &mut self.m.b2, &mut self.v.b2, &grads.b2, lr_t, &c);
    }
}

fn update<D: Dimension>(
    theta: &mut Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    g: &Array<f64, D>,
    lr_t: f64,
    c: &AdamConfig,
) {
    Zip::from(theta).and(m).and(v).and(g).for_each(|theta, m, v, &g| {
        *m = c.beta1 * *m + (1.0 - c.beta1) * g;
        *v = c.beta2 * *v + (1.0 - c.beta2) * g * g;
        *theta -= lr_t * *m / (v.sqrt() + c.epsilon);
    });
}
