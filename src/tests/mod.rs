// Test modules for all components
pub mod test_activations;
pub mod test_layers;
pub mod test_optimizer;

use ndarray::{array, Array1};
use rand::RngCore;

use crate::environment::{Environment, Step};
use crate::error::{DqnError, Result};

/// One state, two actions, every episode lasts a single step:
/// action 0 pays +1, action 1 pays -1.
pub struct TwoArmedEnv;

impl TwoArmedEnv {
    pub fn state() -> Array1<f32> {
        array![1.0, 0.5]
    }
}

impl Environment for TwoArmedEnv {
    fn state_dimension(&self) -> usize {
        2
    }

    fn action_count(&self) -> usize {
        2
    }

    fn reset(&mut self, _rng: &mut dyn RngCore) -> Result<Array1<f32>> {
        Ok(Self::state())
    }

    fn step(&mut self, action: usize, _rng: &mut dyn RngCore) -> Result<Step> {
        let reward = if action == 0 { 1.0 } else { -1.0 };
        Ok(Step {
            next_state: Self::state(),
            reward,
            terminal: true,
        })
    }
}

/// Never terminates and fails on the `fail_at`-th step.
pub struct FailingEnv {
    pub steps: usize,
    pub fail_at: usize,
}

impl Environment for FailingEnv {
    fn state_dimension(&self) -> usize {
        2
    }

    fn action_count(&self) -> usize {
        2
    }

    fn reset(&mut self, _rng: &mut dyn RngCore) -> Result<Array1<f32>> {
        Ok(array![0.0, 0.0])
    }

    fn step(&mut self, _action: usize, _rng: &mut dyn RngCore) -> Result<Step> {
        self.steps += 1;
        if self.steps == self.fail_at {
            return Err(DqnError::environment("malformed observation"));
        }
        Ok(Step {
            next_state: array![self.steps as f32 * 0.01, 0.0],
            reward: 1.0,
            terminal: false,
        })
    }
}
