use crate::layers::DenseGradients;

/// Global-norm gradient clipping.
///
/// Every weight and bias gradient of the network is treated as one flat
/// vector; if its L2 norm exceeds `max_norm` all gradients are scaled by the
/// same factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientClipper {
    pub max_norm: f32,
}

impl GradientClipper {
    /// Added to the norm before dividing, as torch's `clip_grad_norm_` does.
    pub const NORM_EPSILON: f32 = 1e-6;

    pub fn new(max_norm: f32) -> Self {
        GradientClipper { max_norm }
    }

    /// L2 norm over all gradients of all layers.
    pub fn global_norm(gradients: &[DenseGradients]) -> f32 {
        gradients
            .iter()
            .map(|g| {
                let weights: f32 = g.weights.iter().map(|&x| x * x).sum();
                let biases: f32 = g.biases.iter().map(|&x| x * x).sum();
                weights + biases
            })
            .sum::<f32>()
            .sqrt()
    }

    /// Scale `gradients` in place so their global norm is at most `max_norm`.
    /// Returns the norm before clipping.
    pub fn clip(&self, gradients: &mut [DenseGradients]) -> f32 {
        let norm = Self::global_norm(gradients);
        let scale = self.max_norm / (norm + Self::NORM_EPSILON);
        if scale < 1.0 {
            for g in gradients.iter_mut() {
                g.weights.mapv_inplace(|x| x * scale);
                g.biases.mapv_inplace(|x| x * scale);
            }
        }
        norm
    }
}

impl Default for GradientClipper {
    fn default() -> Self {
        Self::new(1.0)
    }
}
