use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Activation applied after a dense layer's affine transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Activation {
    /// `max(0, x)`, used on every hidden layer.
    #[default]
    Relu,
    /// Identity, used on the output layer so Q-values are unbounded.
    Linear,
}

impl Activation {
    /// Apply the activation function to a batch in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        match self {
            Activation::Relu => {
                inputs.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
        }
    }

    /// Derivative of the activation evaluated at the pre-activation values.
    ///
    /// ReLU uses the subgradient 0 at exactly zero.
    pub fn derivative_batch(&self, pre_activation: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(pre_activation.dim()),
        }
    }

    /// Activation used for layer `index` of a network with `layer_count` dense layers.
    pub fn for_layer(index: usize, layer_count: usize) -> Self {
        if index + 1 == layer_count {
            Activation::Linear
        } else {
            Activation::Relu
        }
    }
}
