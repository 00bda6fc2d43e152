//! The action-value approximator.
//!
//! [`QNetwork`] only describes the architecture (`state_dim → hidden… →
//! action_count`, ReLU on hidden layers, identity on the output). The weights
//! live in a separate [`NetworkParams`] value, so the policy and the target
//! network are simply two parameter sets evaluated by the same `QNetwork`.

use std::fs;
use std::path::Path;

use bincode::{deserialize, serialize};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::layers::{DenseGradients, DenseLayer, LayerCache, WeightInit};
use crate::optimizer::{GradientClipper, Optimizer};

/// Weights and biases of every dense layer, input layer first.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NetworkParams {
    pub layers: Vec<DenseLayer>,
}

impl NetworkParams {
    pub fn new(layers: Vec<DenseLayer>) -> Self {
        NetworkParams { layers }
    }

    /// `(input, output)` size of every layer.
    pub fn shapes(&self) -> Vec<(usize, usize)> {
        self.layers.iter().map(|l| (l.input_size(), l.output_size())).collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.biases.len()).sum()
    }

    pub fn is_finite(&self) -> bool {
        self.layers
            .iter()
            .all(|l| l.weights.iter().chain(l.biases.iter()).all(|v| v.is_finite()))
    }

    /// Fails with [`DqnError::Numerical`] naming the first layer holding NaN or infinite values.
    pub fn check_finite(&self) -> Result<()> {
        for (index, layer) in self.layers.iter().enumerate() {
            let nan = layer.weights.iter().chain(layer.biases.iter()).filter(|v| v.is_nan()).count();
            let inf = layer
                .weights
                .iter()
                .chain(layer.biases.iter())
                .filter(|v| v.is_infinite())
                .count();
            if nan > 0 || inf > 0 {
                return Err(DqnError::Numerical(format!(
                    "layer {} has {} NaN and {} infinite parameters",
                    index, nan, inf
                )));
            }
        }
        Ok(())
    }

    /// Serialize the parameters to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let serialized = serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load parameters written by [`NetworkParams::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let buffer = fs::read(path)?;
        let deserialized: Self = deserialize(&buffer)?;
        Ok(deserialized)
    }
}

/// Loss and gradient norm of one optimization step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateStats {
    /// Mean squared TD error before the update.
    pub loss: f32,
    /// Global gradient norm before clipping.
    pub grad_norm: f32,
}

/// Fixed-topology feed-forward Q-network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QNetwork {
    layer_sizes: Vec<usize>,
}

impl QNetwork {
    /// `layer_sizes` includes the input (state size) and output (action count) layers.
    pub fn new(layer_sizes: &[usize]) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_parameter(
                "layer_sizes".to_string(),
                format!("need at least input and output sizes, got {}", layer_sizes.len()),
            ));
        }
        if let Some(position) = layer_sizes.iter().position(|&s| s == 0) {
            return Err(DqnError::invalid_parameter(
                "layer_sizes".to_string(),
                format!("layer {} has size 0", position),
            ));
        }
        Ok(QNetwork {
            layer_sizes: layer_sizes.to_vec(),
        })
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn state_dimension(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn action_count(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Number of dense layers.
    pub fn layer_count(&self) -> usize {
        self.layer_sizes.len() - 1
    }

    pub fn activation(&self, layer: usize) -> Activation {
        Activation::for_layer(layer, self.layer_count())
    }

    /// Draw a fresh parameter set.
    pub fn init_params<R: Rng + ?Sized>(&self, init: &WeightInit, rng: &mut R) -> NetworkParams {
        let layers = self
            .layer_sizes
            .windows(2)
            .map(|window| DenseLayer::new(window[0], window[1], init, rng))
            .collect();
        NetworkParams::new(layers)
    }

    /// Check that `params` has exactly this network's shape.
    pub fn validate_params(&self, params: &NetworkParams) -> Result<()> {
        let expected: Vec<(usize, usize)> = self.layer_sizes.windows(2).map(|w| (w[0], w[1])).collect();
        let actual = params.shapes();
        let biases_match = params.layers.iter().all(|l| l.biases.len() == l.output_size());
        if expected != actual || !biases_match {
            return Err(DqnError::dimension_mismatch(
                format!("layer shapes {:?}", expected),
                format!("layer shapes {:?}", actual),
            ));
        }
        Ok(())
    }

    fn check_states(&self, states: &ArrayView2<f32>) -> Result<()> {
        if states.ncols() != self.state_dimension() {
            return Err(DqnError::dimension_mismatch(
                format!("states of width {}", self.state_dimension()),
                format!("states of width {}", states.ncols()),
            ));
        }
        Ok(())
    }

    /// Forward pass keeping every layer's cache for backprop.
    fn forward_cached(&self, params: &NetworkParams, states: ArrayView2<f32>) -> (Array2<f32>, Vec<LayerCache>) {
        let mut caches = Vec::with_capacity(params.layers.len());
        let mut current = states.to_owned();
        for (index, layer) in params.layers.iter().enumerate() {
            let (output, cache) = layer.forward_batch(current.view(), self.activation(index));
            caches.push(cache);
            current = output;
        }
        (current, caches)
    }

    /// Action values for a batch: `(N, state_dim)` in, `(N, action_count)` out.
    pub fn evaluate(&self, params: &NetworkParams, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_states(&states)?;
        self.validate_params(params)?;
        let (values, _) = self.forward_cached(params, states);
        Ok(values)
    }

    /// Action values for a single state.
    pub fn evaluate_one(&self, params: &NetworkParams, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let values = self.evaluate(params, state.insert_axis(Axis(0)))?;
        Ok(values.index_axis_move(Axis(0), 0))
    }

    /// Mean squared error between `Q(s_i, a_i)` and `targets[i]`.
    pub fn loss(
        &self,
        params: &NetworkParams,
        states: ArrayView2<f32>,
        actions: &[usize],
        targets: ArrayView1<f32>,
    ) -> Result<f32> {
        self.check_batch(states.nrows(), actions, &targets)?;
        if actions.is_empty() {
            return Ok(0.0);
        }
        let values = self.evaluate(params, states)?;
        let total: f32 = actions
            .iter()
            .zip(targets.iter())
            .enumerate()
            .map(|(i, (&a, &y))| (values[[i, a]] - y).powi(2))
            .sum();
        Ok(total / actions.len() as f32)
    }

    fn check_batch(&self, rows: usize, actions: &[usize], targets: &ArrayView1<f32>) -> Result<()> {
        if actions.len() != rows || targets.len() != rows {
            return Err(DqnError::dimension_mismatch(
                format!("{} actions and targets", rows),
                format!("{} actions and {} targets", actions.len(), targets.len()),
            ));
        }
        let action_count = self.action_count();
        if let Some(&action) = actions.iter().find(|&&a| a >= action_count) {
            return Err(DqnError::InvalidAction { action, action_count });
        }
        Ok(())
    }

    /// One clipped gradient update of `params` towards `targets` on the taken actions.
    ///
    /// Loss is `mean_i (Q(s_i, a_i) - y_i)^2`; only the taken action's output
    /// receives error. Shapes through the backward pass, for layer `l` with
    /// `x: (N, in)`, `z = x·W + b: (N, out)`:
    /// `δ = dL/d(out) ⊙ act'(z)`, `dW = xᵀ·δ: (in, out)`, `db = Σ_rows δ: (out)`,
    /// `dL/dx = δ·Wᵀ: (N, in)`.
    ///
    /// An empty batch leaves `params` untouched and returns `Ok(None)`.
    #[allow(clippy::too_many_arguments)]
    pub fn gradient_step<O: Optimizer + ?Sized>(
        &self,
        params: &mut NetworkParams,
        optimizer: &mut O,
        states: ArrayView2<f32>,
        actions: &[usize],
        targets: ArrayView1<f32>,
        learning_rate: f32,
        clip_norm: f32,
    ) -> Result<Option<UpdateStats>> {
        self.check_batch(states.nrows(), actions, &targets)?;
        let n = actions.len();
        if n == 0 {
            return Ok(None);
        }
        if !(clip_norm > 0.0) {
            return Err(DqnError::invalid_parameter(
                "clip_norm".to_string(),
                format!("must be positive, got {}", clip_norm),
            ));
        }
        self.check_states(&states)?;
        self.validate_params(params)?;

        let (outputs, caches) = self.forward_cached(params, states);

        let mut output_errors = Array2::<f32>::zeros(outputs.raw_dim());
        let mut loss = 0.0;
        for (i, (&action, &target)) in actions.iter().zip(targets.iter()).enumerate() {
            let diff = outputs[[i, action]] - target;
            loss += diff * diff;
            output_errors[[i, action]] = 2.0 * diff / n as f32;
        }
        loss /= n as f32;

        let mut gradients: Vec<DenseGradients> = Vec::with_capacity(params.layers.len());
        let mut current_errors = output_errors;
        for (index, (layer, cache)) in params.layers.iter().zip(caches.iter()).enumerate().rev() {
            let (input_errors, layer_gradients) =
                layer.backward_batch(cache, current_errors.view(), self.activation(index));
            gradients.push(layer_gradients);
            current_errors = input_errors;
        }
        gradients.reverse();

        let grad_norm = GradientClipper::new(clip_norm).clip(&mut gradients);

        optimizer.begin_step();
        for (index, (layer, layer_gradients)) in params.layers.iter_mut().zip(gradients.iter()).enumerate() {
            optimizer.update_weights(index, &mut layer.weights, &layer_gradients.weights, learning_rate);
            optimizer.update_biases(index, &mut layer.biases, &layer_gradients.biases, learning_rate);
        }

        Ok(Some(UpdateStats { loss, grad_norm }))
    }
}
