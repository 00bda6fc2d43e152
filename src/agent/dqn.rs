use std::path::Path;

use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::DqnConfig;
use crate::environment::{Environment, StopSignal};
use crate::error::{DqnError, Result};
use crate::exploration::{greedy_action, EpsilonGreedy};
use crate::metrics::{EpisodeStats, MetricsTracker};
use crate::network::{NetworkParams, QNetwork, UpdateStats};
use crate::optimizer::OptimizerWrapper;
use crate::replay_buffer::{ReplayBuffer, Transition};

/// Deep Q-Network agent with experience replay and a hard-synced target network.
///
/// The agent owns both parameter sets, the replay buffer, the exploration
/// schedule and its random generator; everything runs on the caller's thread.
///
/// # Example
///
/// ```rust
/// use deepq::agent::DqnAgent;
/// use deepq::config::DqnConfig;
/// use deepq::replay_buffer::Transition;
/// use ndarray::array;
///
/// // 4 state variables, 2 actions
/// let config = DqnConfig::default().hidden_sizes(&[16, 16]).batch_size(2).seed(7);
/// let mut agent = DqnAgent::new(config, 4, 2).unwrap();
///
/// let state = array![0.1, -0.2, 0.3, -0.1];
/// let action = agent.act(state.view()).unwrap();
///
/// // After environment step...
/// agent
///     .remember(Transition {
///         state: state.clone(),
///         action,
///         reward: 1.0,
///         next_state: array![0.15, -0.25, 0.35, -0.05],
///         terminal: false,
///     })
///     .unwrap();
///
/// // Not enough transitions for a batch of 2 yet
/// assert!(agent.optimize().unwrap().is_none());
/// ```
pub struct DqnAgent {
    config: DqnConfig,
    network: QNetwork,
    /// Trained parameters, used for action selection
    policy: NetworkParams,
    /// Lagged copy of `policy`, used only for bootstrapped targets
    target: NetworkParams,
    optimizer: OptimizerWrapper,
    buffer: ReplayBuffer,
    explorer: EpsilonGreedy,
    rng: StdRng,
    metrics: MetricsTracker,
    /// Episodes completed so far; the index of the next episode
    episodes: usize,
}

impl DqnAgent {
    /// Build an agent for an environment with `state_dimension` inputs and `action_count` actions.
    pub fn new(config: DqnConfig, state_dimension: usize, action_count: usize) -> Result<Self> {
        config.validate()?;

        let mut layer_sizes = Vec::with_capacity(config.hidden_sizes.len() + 2);
        layer_sizes.push(state_dimension);
        layer_sizes.extend_from_slice(&config.hidden_sizes);
        layer_sizes.push(action_count);
        let network = QNetwork::new(&layer_sizes)?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let policy = network.init_params(&config.weight_init, &mut rng);
        let target = policy.clone();

        Ok(DqnAgent {
            optimizer: config.optimizer.build(),
            buffer: ReplayBuffer::new(config.buffer_capacity)?,
            explorer: EpsilonGreedy::new(config.epsilon_start, config.epsilon_min, config.epsilon_decay_rate)?,
            network,
            policy,
            target,
            rng,
            metrics: MetricsTracker::default(),
            episodes: 0,
            config,
        })
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn network(&self) -> &QNetwork {
        &self.network
    }

    pub fn policy(&self) -> &NetworkParams {
        &self.policy
    }

    /// Direct access to the trained parameters; shapes are re-validated on every use.
    pub fn policy_mut(&mut self) -> &mut NetworkParams {
        &mut self.policy
    }

    pub fn target(&self) -> &NetworkParams {
        &self.target
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn epsilon(&self) -> f32 {
        self.explorer.epsilon()
    }

    /// Episodes completed so far.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Policy action values for `state`.
    pub fn q_values(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.network.evaluate_one(&self.policy, state)
    }

    /// Select an action with the epsilon-greedy policy.
    pub fn act(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        let q_values = self.q_values(state)?;
        Ok(self.explorer.select_action(q_values.view(), &mut self.rng))
    }

    /// Best action under the policy network, ignoring epsilon.
    pub fn greedy_action(&self, state: ArrayView1<f32>) -> Result<usize> {
        let q_values = self.q_values(state)?;
        Ok(greedy_action(q_values.view()))
    }

    fn check_state(&self, state: &Array1<f32>, what: &str) -> Result<()> {
        let expected = self.network.state_dimension();
        if state.len() != expected {
            return Err(DqnError::dimension_mismatch(
                format!("{} of length {}", what, expected),
                format!("{} of length {}", what, state.len()),
            ));
        }
        Ok(())
    }

    /// Store a transition in the replay buffer.
    pub fn remember(&mut self, transition: Transition) -> Result<()> {
        self.check_state(&transition.state, "state")?;
        self.check_state(&transition.next_state, "next_state")?;
        let action_count = self.network.action_count();
        if transition.action >= action_count {
            return Err(DqnError::InvalidAction {
                action: transition.action,
                action_count,
            });
        }
        self.buffer.push(transition);
        Ok(())
    }

    /// Overwrite the target parameters with the policy parameters.
    pub fn sync_target(&mut self) {
        self.target.clone_from(&self.policy);
    }

    /// One gradient update on a sampled batch.
    ///
    /// Returns `Ok(None)` while the buffer holds fewer than `batch_size` transitions.
    pub fn optimize(&mut self) -> Result<Option<UpdateStats>> {
        let batch_size = self.config.batch_size;
        let state_dim = self.network.state_dimension();

        let (states, next_states, actions, rewards, terminals) = {
            let batch = match self.buffer.sample(batch_size, &mut self.rng) {
                Ok(batch) => batch,
                Err(e) if e.is_recoverable() => return Ok(None),
                Err(e) => return Err(e),
            };

            let mut states = Array2::zeros((batch_size, state_dim));
            let mut next_states = Array2::zeros((batch_size, state_dim));
            let mut actions = Vec::with_capacity(batch_size);
            let mut rewards = Vec::with_capacity(batch_size);
            let mut terminals = Vec::with_capacity(batch_size);
            for (i, transition) in batch.iter().enumerate() {
                states.row_mut(i).assign(&transition.state);
                next_states.row_mut(i).assign(&transition.next_state);
                actions.push(transition.action);
                rewards.push(transition.reward);
                terminals.push(transition.terminal);
            }
            (states, next_states, actions, rewards, terminals)
        };

        // Bootstrapped targets come from the lagged parameters
        let next_values = self.network.evaluate(&self.target, next_states.view())?;
        let gamma = self.config.gamma;
        let targets: Array1<f32> = rewards
            .iter()
            .zip(terminals.iter())
            .zip(next_values.rows())
            .map(|((&reward, &terminal), row)| {
                if terminal {
                    reward
                } else {
                    reward + gamma * row.fold(f32::NEG_INFINITY, |max, &v| max.max(v))
                }
            })
            .collect();

        let stats = self.network.gradient_step(
            &mut self.policy,
            &mut self.optimizer,
            states.view(),
            &actions,
            targets.view(),
            self.config.learning_rate,
            self.config.clip_norm,
        )?;

        if let Some(stats) = stats {
            if self.config.check_numerics {
                if !stats.loss.is_finite() {
                    return Err(DqnError::Numerical(format!("loss became {}", stats.loss)));
                }
                self.policy.check_finite()?;
            }
            debug!("update {}: loss {:.6}, grad norm {:.6}", self.metrics.total_updates(), stats.loss, stats.grad_norm);
            self.metrics.record_update(stats.loss, stats.grad_norm);
        }
        Ok(stats)
    }

    fn check_environment<E: Environment + ?Sized>(&self, env: &E) -> Result<()> {
        let expected = (self.network.state_dimension(), self.network.action_count());
        let actual = (env.state_dimension(), env.action_count());
        if expected != actual {
            return Err(DqnError::dimension_mismatch(
                format!("environment with (state_dimension, action_count) = {:?}", expected),
                format!("environment with (state_dimension, action_count) = {:?}", actual),
            ));
        }
        Ok(())
    }

    /// Run one training episode: reset, step until terminal or `max_steps`,
    /// then decay epsilon and sync the target on every `update_coeff`-th episode.
    pub fn run_episode<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<EpisodeStats> {
        self.check_environment(env)?;
        let episode = self.episodes;

        let mut state = env.reset(&mut self.rng)?;
        self.check_state(&state, "observation")?;

        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut loss_sum = 0.0;
        let mut updates = 0;

        while steps < self.config.max_steps {
            let action = self.act(state.view())?;
            let step = env.step(action, &mut self.rng)?;
            self.check_state(&step.next_state, "observation")?;

            total_reward += step.reward;
            steps += 1;
            self.metrics.record_step();

            let terminal = step.terminal;
            let next_state = step.next_state;
            self.remember(Transition {
                state,
                action,
                reward: step.reward,
                next_state: next_state.clone(),
                terminal,
            })?;

            if let Some(stats) = self.optimize()? {
                loss_sum += stats.loss;
                updates += 1;
            }

            state = next_state;
            if terminal {
                break;
            }
        }

        let epsilon = self.explorer.decay();
        if episode % self.config.update_coeff == 0 {
            self.sync_target();
            debug!("Episode {}: target network synced", episode);
        }
        self.episodes += 1;

        let stats = EpisodeStats {
            episode,
            total_reward,
            epsilon,
            steps,
            mean_loss: (updates > 0).then(|| loss_sum / updates as f32),
        };
        info!("Episode {}, Total Reward: {}, epsilon: {:.2}", episode, total_reward, epsilon);
        self.metrics.record_episode(stats);
        Ok(stats)
    }

    /// Train for `episode_count` episodes.
    pub fn train<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<Vec<EpisodeStats>> {
        self.train_until(env, &StopSignal::new())
    }

    /// Train for `episode_count` episodes or until `stop` is raised; checked between episodes.
    pub fn train_until<E: Environment + ?Sized>(&mut self, env: &mut E, stop: &StopSignal) -> Result<Vec<EpisodeStats>> {
        self.check_environment(env)?;
        let mut history = Vec::with_capacity(self.config.episode_count);
        for _ in 0..self.config.episode_count {
            if stop.is_stopped() {
                warn!("Stop requested, ending training after {} episodes", history.len());
                break;
            }
            history.push(self.run_episode(env)?);
        }
        info!("Training complete.");
        Ok(history)
    }

    /// Greedy rollout without learning or exploration. Returns the total reward.
    pub fn evaluate_greedy<E: Environment + ?Sized>(&mut self, env: &mut E, max_steps: usize) -> Result<f32> {
        self.check_environment(env)?;
        let mut state = env.reset(&mut self.rng)?;
        self.check_state(&state, "observation")?;
        let mut total_reward = 0.0;
        for _ in 0..max_steps {
            let action = self.greedy_action(state.view())?;
            let step = env.step(action, &mut self.rng)?;
            self.check_state(&step.next_state, "observation")?;
            total_reward += step.reward;
            if step.terminal {
                break;
            }
            state = step.next_state;
        }
        Ok(total_reward)
    }

    /// Save the policy parameters.
    pub fn save_policy(&self, path: impl AsRef<Path>) -> Result<()> {
        self.policy.save(path)
    }

    /// Replace policy and target with parameters saved by [`DqnAgent::save_policy`].
    pub fn load_policy(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let params = NetworkParams::load(path)?;
        self.network.validate_params(&params)?;
        self.target = params.clone();
        self.policy = params;
        Ok(())
    }
}
