//! # Deep Q-Learning Agent
//!
//! [`DqnAgent`] ties the pieces together:
//!
//! - a [`QNetwork`](crate::network::QNetwork) evaluated over two parameter sets,
//!   the trained **policy** and the lagged **target**
//! - a [`ReplayBuffer`](crate::replay_buffer::ReplayBuffer) of past transitions
//! - an [`EpsilonGreedy`](crate::exploration::EpsilonGreedy) exploration schedule
//!
//! ## Episode loop
//!
//! 1. Reset the environment and zero the reward accumulator
//! 2. Each step: pick an action, step the environment, store the transition,
//!    and once the buffer holds `batch_size` transitions run one update with
//!    targets `r` (terminal) or `r + gamma * max_a Q_target(s', a)`
//! 3. At the end: decay epsilon, and every `update_coeff` episodes copy the
//!    policy parameters into the target
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use deepq::agent::DqnAgent;
//! use deepq::config::DqnConfig;
//! # use deepq::environment::{Environment, Step};
//! # use ndarray::{array, Array1};
//! # use rand::RngCore;
//! # struct MyEnv;
//! # impl Environment for MyEnv {
//! #     fn state_dimension(&self) -> usize { 4 }
//! #     fn action_count(&self) -> usize { 2 }
//! #     fn reset(&mut self, _: &mut dyn RngCore) -> deepq::error::Result<Array1<f32>> { Ok(Array1::zeros(4)) }
//! #     fn step(&mut self, _: usize, _: &mut dyn RngCore) -> deepq::error::Result<Step> {
//! #         Ok(Step { next_state: Array1::zeros(4), reward: 1.0, terminal: true })
//! #     }
//! # }
//!
//! let mut env = MyEnv;
//! let mut agent = DqnAgent::new(DqnConfig::default(), 4, 2).unwrap();
//! for stats in agent.train(&mut env).unwrap() {
//!     println!("{} {} {}", stats.episode, stats.total_reward, stats.epsilon);
//! }
//! agent.save_policy("trained_cartpole.bin").unwrap();
//! ```

mod dqn;

pub use dqn::DqnAgent;
