use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::initialization::WeightInit;
use crate::activations::Activation;
use crate::error::{DqnError, Result};

/// Parameters of a fully connected layer.
///
/// `weights` has shape `(input_size, output_size)` so a batch `x` of shape
/// `(N, input_size)` maps to `x · W + b` of shape `(N, output_size)`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// Values saved by a forward pass that the backward pass needs.
#[derive(Clone, Debug)]
pub struct LayerCache {
    /// `(N, input_size)`
    pub inputs: Array2<f32>,
    /// `(N, output_size)`, before the activation
    pub pre_activation: Array2<f32>,
}

/// Gradients of the loss with respect to one layer's parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl DenseLayer {
    /// Create a new dense layer drawing its parameters from `init`.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, init: &WeightInit, rng: &mut R) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng),
            biases: init.initialize_biases(input_size, output_size, rng),
        }
    }

    /// Build a layer from explicit weights and biases.
    pub fn from_parts(weights: Array2<f32>, biases: Array1<f32>) -> Result<Self> {
        if weights.ncols() != biases.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} biases", weights.ncols()),
                format!("{} biases", biases.len()),
            ));
        }
        Ok(DenseLayer { weights, biases })
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Forward pass for a batch. Returns the activated output and the cache for `backward_batch`.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>, activation: Activation) -> (Array2<f32>, LayerCache) {
        let pre_activation = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        let mut outputs = pre_activation.clone();
        activation.apply_batch(&mut outputs);
        let cache = LayerCache {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        (outputs, cache)
    }

    /// Backward pass for a batch.
    ///
    /// `output_errors` is dL/d(output), shape `(N, output_size)`. Returns dL/d(input),
    /// shape `(N, input_size)`, and the parameter gradients.
    pub fn backward_batch(
        &self,
        cache: &LayerCache,
        output_errors: ArrayView2<f32>,
        activation: Activation,
    ) -> (Array2<f32>, DenseGradients) {
        let delta = &output_errors * &activation.derivative_batch(cache.pre_activation.view());
        let gradients = DenseGradients {
            weights: cache.inputs.t().dot(&delta),
            biases: delta.sum_axis(Axis(0)),
        };
        let input_errors = delta.dot(&self.weights.t());
        (input_errors, gradients)
    }
}
