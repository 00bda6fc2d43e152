use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum WeightInit {
    /// `U(-1/sqrt(fan_in), 1/sqrt(fan_in))` for weights and biases
    #[default]
    FanInUniform,

    /// He/Kaiming uniform initialization (for ReLU), zero biases
    HeUniform,

    /// Xavier/Glorot uniform initialization, zero biases
    XavierUniform,

    /// Uniform distribution with custom range for weights and biases
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize an `(fan_in, fan_out)` weight matrix.
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array2::random_using(shape, Uniform::new_inclusive(*min, *max), rng)
            }

            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Initialize the biases of a layer with `fan_in` inputs and `size` outputs.
    pub fn initialize_biases<R: Rng + ?Sized>(&self, fan_in: usize, size: usize, rng: &mut R) -> Array1<f32> {
        match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in as f32).sqrt();
                Array1::random_using(size, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array1::random_using(size, Uniform::new_inclusive(*min, *max), rng)
            }

            WeightInit::HeUniform | WeightInit::XavierUniform | WeightInit::Zeros => Array1::zeros(size),
        }
    }

    /// Reject ranges `rand_distr::Uniform` would panic on.
    pub fn validate(&self) -> crate::error::Result<()> {
        if let WeightInit::Uniform { min, max } = self {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(crate::error::DqnError::invalid_parameter(
                    "weight_init".to_string(),
                    format!("uniform range [{}, {}] is not a finite, ordered interval", min, max),
                ));
            }
        }
        Ok(())
    }
}
