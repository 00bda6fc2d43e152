//! Train a DQN agent to balance a pole on a cart.
//!
//! ```text
//! cargo run --example cartpole -- --episodes 300 --seed 1
//! RUST_LOG=debug cargo run --example cartpole -- --config dqn.yaml
//! ```

use std::path::PathBuf;

use clap::Parser;
use deepq::agent::DqnAgent;
use deepq::config::DqnConfig;
use deepq::environment::{Environment, Step};
use deepq::error::{DqnError, Result};
use log::info;
use ndarray::{array, Array1};
use rand::{Rng, RngCore};

/// Cart-pole with the classic control dynamics: +1 reward per step, the
/// episode ends once the pole leans past 12 degrees or the cart leaves the track.
struct CartPole {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
}

impl CartPole {
    const GRAVITY: f32 = 9.8;
    const MASS_CART: f32 = 1.0;
    const MASS_POLE: f32 = 0.1;
    // half the pole's length
    const LENGTH: f32 = 0.5;
    const FORCE_MAG: f32 = 10.0;
    const TAU: f32 = 0.02;
    const THETA_LIMIT: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;
    const X_LIMIT: f32 = 2.4;

    fn new() -> Self {
        CartPole {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
        }
    }

    fn observation(&self) -> Array1<f32> {
        array![self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

impl Environment for CartPole {
    fn state_dimension(&self) -> usize {
        4
    }

    fn action_count(&self) -> usize {
        2
    }

    fn reset(&mut self, rng: &mut dyn RngCore) -> Result<Array1<f32>> {
        self.x = rng.gen_range(-0.05..0.05);
        self.x_dot = rng.gen_range(-0.05..0.05);
        self.theta = rng.gen_range(-0.05..0.05);
        self.theta_dot = rng.gen_range(-0.05..0.05);
        Ok(self.observation())
    }

    fn step(&mut self, action: usize, _rng: &mut dyn RngCore) -> Result<Step> {
        let force = match action {
            0 => -Self::FORCE_MAG,
            1 => Self::FORCE_MAG,
            _ => {
                return Err(DqnError::InvalidAction {
                    action,
                    action_count: 2,
                })
            }
        };

        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = Self::MASS_CART + Self::MASS_POLE;
        let pole_mass_length = Self::MASS_POLE * Self::LENGTH;

        let temp = (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let theta_acc = (Self::GRAVITY * sin_theta - cos_theta * temp)
            / (Self::LENGTH * (4.0 / 3.0 - Self::MASS_POLE * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Euler integration
        self.x += Self::TAU * self.x_dot;
        self.x_dot += Self::TAU * x_acc;
        self.theta += Self::TAU * self.theta_dot;
        self.theta_dot += Self::TAU * theta_acc;

        let terminal = self.x.abs() > Self::X_LIMIT || self.theta.abs() > Self::THETA_LIMIT;
        Ok(Step {
            next_state: self.observation(),
            reward: 1.0,
            terminal,
        })
    }
}

#[derive(Parser, Debug)]
#[command(name = "cartpole")]
#[command(about = "Train a DQN agent on cart-pole balancing")]
struct Args {
    /// YAML file with the full configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Learning rate
    #[arg(long)]
    lr: Option<f32>,

    /// Discount factor
    #[arg(long)]
    gamma: Option<f32>,

    /// Batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Replay buffer capacity
    #[arg(long)]
    capacity: Option<usize>,

    /// Target network sync interval in episodes
    #[arg(long)]
    update_coeff: Option<usize>,

    /// Number of training episodes
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where to write the trained policy
    #[arg(short, long, default_value = "trained_cartpole.bin")]
    output: PathBuf,

    /// Where to write the training metrics as JSON
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Greedy preview episodes after training
    #[arg(long, default_value = "5")]
    preview: usize,
}

fn build_config(args: &Args) -> Result<DqnConfig> {
    let mut config = match &args.config {
        Some(path) => DqnConfig::load(path)?,
        None => DqnConfig::default(),
    };
    if let Some(v) = args.lr {
        config = config.learning_rate(v);
    }
    if let Some(v) = args.gamma {
        config = config.gamma(v);
    }
    if let Some(v) = args.batch_size {
        config = config.batch_size(v);
    }
    if let Some(v) = args.capacity {
        config = config.buffer_capacity(v);
    }
    if let Some(v) = args.update_coeff {
        config = config.update_coeff(v);
    }
    if let Some(v) = args.episodes {
        config = config.episode_count(v);
    }
    if let Some(v) = args.seed {
        config = config.seed(v);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let max_steps = config.max_steps;
    info!("{:?}", config);

    let mut env = CartPole::new();
    let mut agent = DqnAgent::new(config, env.state_dimension(), env.action_count())?;
    agent.train(&mut env)?;

    for i in 0..args.preview {
        let total_reward = agent.evaluate_greedy(&mut env, max_steps)?;
        info!("Preview {}: balanced for {} steps", i, total_reward);
    }

    agent.save_policy(&args.output)?;
    info!("Saved policy to {}", args.output.display());
    if let Some(path) = &args.metrics {
        agent.metrics().save(path)?;
        info!("Saved metrics to {}", path.display());
    }
    Ok(())
}
