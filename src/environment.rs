//! The boundary between the agent and the world it acts in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array1;
use rand::RngCore;

use crate::error::Result;

/// Outcome of one environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub next_state: Array1<f32>,
    pub reward: f32,
    pub terminal: bool,
}

/// A discrete-action, continuous-state environment.
///
/// Randomness comes only from the generator passed in, so a seeded agent
/// reproduces its episodes exactly. Any `Err` ends training.
pub trait Environment {
    /// Length of every observation.
    fn state_dimension(&self) -> usize;

    /// Actions are `0..action_count()`.
    fn action_count(&self) -> usize;

    /// Start a new episode and return the initial observation.
    fn reset(&mut self, rng: &mut dyn RngCore) -> Result<Array1<f32>>;

    /// Advance by one action.
    fn step(&mut self, action: usize, rng: &mut dyn RngCore) -> Result<Step>;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn state_dimension(&self) -> usize {
        (**self).state_dimension()
    }

    fn action_count(&self) -> usize {
        (**self).action_count()
    }

    fn reset(&mut self, rng: &mut dyn RngCore) -> Result<Array1<f32>> {
        (**self).reset(rng)
    }

    fn step(&mut self, action: usize, rng: &mut dyn RngCore) -> Result<Step> {
        (**self).step(action, rng)
    }
}

/// Cooperative stop request, checked by the agent between episodes.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
