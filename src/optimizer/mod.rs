pub mod gradient_clipper;

use ndarray::{Array, Array1, Array2, Dimension, Zip};
use serde::{Deserialize, Serialize};

pub use gradient_clipper::GradientClipper;

/// Parameter update rule applied layer by layer.
///
/// `begin_step` is called once per gradient step before any layer is updated;
/// `layer` identifies the layer so stateful optimizers can keep per-layer moments.
pub trait Optimizer {
    fn begin_step(&mut self) {}
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32);
    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn begin_step(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.begin_step(),
            OptimizerWrapper::Adam(optimizer) => optimizer.begin_step(),
        }
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
        }
    }
}

/// Plain gradient descent.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam with bias-corrected moment estimates.
///
/// Moments are allocated lazily the first time a layer is updated, so the
/// optimizer does not need to know the network shape up front.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    pub t: u32,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 0,
        }
    }

    fn bias_corrections(&self) -> (f32, f32) {
        // begin_step may not have been called by a caller driving layers by hand
        let t = self.t.max(1) as i32;
        (1.0 - self.beta1.powi(t), 1.0 - self.beta2.powi(t))
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

fn moments_for<D: Dimension>(moments: &mut Vec<Array<f32, D>>, layer: usize, dim: D) -> &mut Array<f32, D> {
    while moments.len() <= layer {
        moments.push(Array::zeros(dim.clone()));
    }
    if moments[layer].raw_dim() != dim {
        moments[layer] = Array::zeros(dim);
    }
    &mut moments[layer]
}

fn adam_update<D: Dimension>(
    params: &mut Array<f32, D>,
    gradients: &Array<f32, D>,
    m: &mut Array<f32, D>,
    v: &mut Array<f32, D>,
    hyper: (f32, f32, f32),
    corrections: (f32, f32),
    learning_rate: f32,
) {
    let (beta1, beta2, epsilon) = hyper;
    let (correction1, correction2) = corrections;
    Zip::from(params)
        .and(gradients)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / correction1;
            let v_hat = *v / correction2;
            *p -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        });
}

impl Optimizer for Adam {
    fn begin_step(&mut self) {
        self.t += 1;
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        let hyper = (self.beta1, self.beta2, self.epsilon);
        let corrections = self.bias_corrections();
        moments_for(&mut self.v_weights, layer, weights.raw_dim());
        let m = moments_for(&mut self.m_weights, layer, weights.raw_dim());
        let v = &mut self.v_weights[layer];
        adam_update(weights, gradients, m, v, hyper, corrections, learning_rate);
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        let hyper = (self.beta1, self.beta2, self.epsilon);
        let corrections = self.bias_corrections();
        moments_for(&mut self.v_biases, layer, biases.raw_dim());
        let m = moments_for(&mut self.m_biases, layer, biases.raw_dim());
        let v = &mut self.v_biases[layer];
        adam_update(biases, gradients, m, v, hyper, corrections, learning_rate);
    }
}
