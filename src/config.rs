//! Configuration of [`DqnAgent`](crate::agent::DqnAgent).
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};
use crate::layers::WeightInit;
use crate::optimizer::{Adam, OptimizerWrapper, SGD};

/// Which update rule trains the policy network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum OptimizerConfig {
    Sgd,
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Adam {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl OptimizerConfig {
    /// A fresh optimizer with no accumulated state.
    pub fn build(&self) -> OptimizerWrapper {
        match *self {
            OptimizerConfig::Sgd => OptimizerWrapper::SGD(SGD::new()),
            OptimizerConfig::Adam { beta1, beta2, epsilon } => OptimizerWrapper::Adam(Adam::new(beta1, beta2, epsilon)),
        }
    }
}

/// Hyperparameters of a training run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct DqnConfig {
    /// Hidden layer widths between the state input and the action output.
    pub hidden_sizes: Vec<usize>,

    /// Step size of every gradient update.
    pub learning_rate: f32,

    /// Discount factor of the bootstrapped target.
    pub gamma: f32,

    /// Transitions per gradient update; no update runs until the buffer holds this many.
    pub batch_size: usize,

    /// Maximum number of stored transitions.
    pub buffer_capacity: usize,

    /// Hard target sync every `update_coeff` episodes (episode 0 included).
    pub update_coeff: usize,

    /// Episodes per training run.
    pub episode_count: usize,

    /// Step cap per episode.
    pub max_steps: usize,

    pub epsilon_start: f32,
    pub epsilon_min: f32,

    /// Per-episode multiplicative decay: `epsilon *= 1 - epsilon_decay_rate`.
    pub epsilon_decay_rate: f32,

    /// Bound on the global gradient norm.
    pub clip_norm: f32,

    pub optimizer: OptimizerConfig,

    pub weight_init: WeightInit,

    /// Seed of the agent's random generator.
    pub seed: u64,

    /// Abort training on NaN or infinite loss/parameters.
    pub check_numerics: bool,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![128, 128],
            learning_rate: 1e-4,
            gamma: 0.99,
            batch_size: 64,
            buffer_capacity: 100_000,
            update_coeff: 10,
            episode_count: 200,
            max_steps: 200,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay_rate: 0.01,
            clip_norm: 1.0,
            optimizer: OptimizerConfig::default(),
            weight_init: WeightInit::default(),
            seed: 0,
            check_numerics: true,
        }
    }
}

impl DqnConfig {
    /// Sets the hidden layer widths.
    pub fn hidden_sizes(mut self, v: &[usize]) -> Self {
        self.hidden_sizes = v.to_vec();
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the replay buffer capacity.
    pub fn buffer_capacity(mut self, v: usize) -> Self {
        self.buffer_capacity = v;
        self
    }

    /// Sets the target sync interval in episodes.
    pub fn update_coeff(mut self, v: usize) -> Self {
        self.update_coeff = v;
        self
    }

    /// Sets the number of training episodes.
    pub fn episode_count(mut self, v: usize) -> Self {
        self.episode_count = v;
        self
    }

    /// Sets the step cap per episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the exploration schedule.
    pub fn epsilon(mut self, start: f32, min: f32, decay_rate: f32) -> Self {
        self.epsilon_start = start;
        self.epsilon_min = min;
        self.epsilon_decay_rate = decay_rate;
        self
    }

    /// Sets the gradient clipping norm.
    pub fn clip_norm(mut self, v: f32) -> Self {
        self.clip_norm = v;
        self
    }

    /// Sets the optimizer.
    pub fn optimizer(mut self, v: OptimizerConfig) -> Self {
        self.optimizer = v;
        self
    }

    /// Sets the weight initialization.
    pub fn weight_init(mut self, v: WeightInit) -> Self {
        self.weight_init = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Enables or disables the numeric health check.
    pub fn check_numerics(mut self, v: bool) -> Self {
        self.check_numerics = v;
        self
    }

    /// Reject values the agent cannot run with.
    pub fn validate(&self) -> Result<()> {
        fn invalid(name: &str, reason: String) -> Result<()> {
            Err(DqnError::invalid_parameter(name.to_string(), reason))
        }

        if self.hidden_sizes.iter().any(|&s| s == 0) {
            return invalid("hidden_sizes", format!("{:?} contains a zero width", self.hidden_sizes));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid("learning_rate", format!("must be positive, got {}", self.learning_rate));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid("gamma", format!("must be in [0, 1], got {}", self.gamma));
        }
        if self.batch_size == 0 {
            return invalid("batch_size", "must be greater than 0".to_string());
        }
        if self.buffer_capacity < self.batch_size {
            return invalid(
                "buffer_capacity",
                format!("{} cannot hold a batch of {}", self.buffer_capacity, self.batch_size),
            );
        }
        if self.update_coeff == 0 {
            return invalid("update_coeff", "must be greater than 0".to_string());
        }
        if self.max_steps == 0 {
            return invalid("max_steps", "must be greater than 0".to_string());
        }
        if !(self.clip_norm.is_finite() && self.clip_norm > 0.0) {
            return invalid("clip_norm", format!("must be positive, got {}", self.clip_norm));
        }
        self.weight_init.validate()?;
        // epsilon bounds are checked by EpsilonGreedy::new
        crate::exploration::EpsilonGreedy::new(self.epsilon_start, self.epsilon_min, self.epsilon_decay_rate)?;
        Ok(())
    }

    /// Constructs [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`DqnConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
