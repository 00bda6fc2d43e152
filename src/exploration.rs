//! Epsilon-greedy exploration with a multiplicative per-episode decay.

use ndarray::ArrayView1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

/// Index of the largest value; the lowest index wins ties.
///
/// NaN never compares greater, so it is only chosen when every value is NaN.
pub fn greedy_action(q_values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (index, &value) in q_values.iter().enumerate().skip(1) {
        if value > q_values[best] || (q_values[best].is_nan() && !value.is_nan()) {
            best = index;
        }
    }
    best
}

/// `max(epsilon_min, epsilon * (1 - decay_rate))`
pub fn decayed(epsilon: f32, epsilon_min: f32, decay_rate: f32) -> f32 {
    (epsilon * (1.0 - decay_rate)).max(epsilon_min)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f32,
    epsilon_min: f32,
    decay_rate: f32,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f32, epsilon_min: f32, decay_rate: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon_min) || !(epsilon_min..=1.0).contains(&epsilon) {
            return Err(DqnError::invalid_parameter(
                "epsilon".to_string(),
                format!("need 0 <= epsilon_min ({}) <= epsilon ({}) <= 1", epsilon_min, epsilon),
            ));
        }
        if !(0.0..=1.0).contains(&decay_rate) {
            return Err(DqnError::invalid_parameter(
                "epsilon_decay_rate".to_string(),
                format!("must be in [0, 1], got {}", decay_rate),
            ));
        }
        Ok(EpsilonGreedy {
            epsilon,
            epsilon_min,
            decay_rate,
        })
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn epsilon_min(&self) -> f32 {
        self.epsilon_min
    }

    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    /// Overrides the current epsilon, clamped into `[epsilon_min, 1]`.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.clamp(self.epsilon_min, 1.0);
    }

    /// With probability epsilon a uniform random action, otherwise the greedy one.
    pub fn select_action<R: Rng + ?Sized>(&self, q_values: ArrayView1<f32>, rng: &mut R) -> usize {
        if rng.gen::<f32>() < self.epsilon {
            rng.gen_range(0..q_values.len())
        } else {
            greedy_action(q_values)
        }
    }

    /// Apply one decay step and return the new epsilon.
    pub fn decay(&mut self) -> f32 {
        self.epsilon = decayed(self.epsilon, self.epsilon_min, self.decay_rate);
        self.epsilon
    }
}
