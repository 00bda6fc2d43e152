//! # deepq - Deep Q-Learning for Discrete-Action Control
//!
//! deepq is a deep Q-learning core: a value-based
//! agent that learns to act in a discrete-action, continuous-state
//! environment (pole balancing being the canonical one) by approximating the
//! action-value function with a feed-forward network.
//!
//! ## Key Features
//!
//! - **Hand-derived backprop**: fixed-topology ReLU network, closed-form gradients
//! - **Target network**: lagged parameter set refreshed by hard sync
//! - **Experience replay**: bounded FIFO store with uniform sampling
//! - **Gradient clipping**: global-norm clipping before every update
//! - **Reproducible**: one seeded generator threaded through every random choice
//!
//! ## Quick Start
//!
//! ```rust
//! use deepq::agent::DqnAgent;
//! use deepq::config::DqnConfig;
//! use ndarray::array;
//!
//! let config = DqnConfig::default().hidden_sizes(&[32, 32]).seed(42);
//! let mut agent = DqnAgent::new(config, 4, 2).unwrap();
//! let action = agent.act(array![0.0, 0.1, -0.05, 0.0].view()).unwrap();
//! assert!(action < 2);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - ReLU and identity activations
//! - [`agent`] - The DQN training orchestrator
//! - [`config`] - Hyperparameters, YAML load/save
//! - [`environment`] - Environment trait and stop signal
//! - [`error`] - Error types and result handling
//! - [`exploration`] - Epsilon-greedy action selection and decay
//! - [`layers`] - Dense layer math and weight initialization
//! - [`metrics`] - Per-episode telemetry and training metrics
//! - [`network`] - Q-network architecture and parameter sets
//! - [`optimizer`] - SGD, Adam and gradient clipping
//! - [`replay_buffer`] - Experience replay

pub mod activations;
pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod exploration;
pub mod layers;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;

#[cfg(test)]
mod tests;
