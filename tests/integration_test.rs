use deepq::{
    agent::DqnAgent,
    config::{DqnConfig, OptimizerConfig},
    environment::{Environment, StopSignal, Step},
    error::{DqnError, Result},
    metrics::MetricsTracker,
};
use ndarray::Array1;
use rand::{Rng, RngCore};

/// Five cells in a row, start in the middle. Reaching the right end pays +1,
/// the left end pays -1, every other step costs 0.01.
struct Corridor {
    position: usize,
}

impl Corridor {
    const CELLS: usize = 5;

    fn new() -> Self {
        Corridor { position: 2 }
    }

    fn observation(&self) -> Array1<f32> {
        let mut state = Array1::zeros(Self::CELLS);
        state[self.position] = 1.0;
        state
    }
}

impl Environment for Corridor {
    fn state_dimension(&self) -> usize {
        Self::CELLS
    }

    fn action_count(&self) -> usize {
        2
    }

    fn reset(&mut self, _rng: &mut dyn RngCore) -> Result<Array1<f32>> {
        self.position = 2;
        Ok(self.observation())
    }

    fn step(&mut self, action: usize, _rng: &mut dyn RngCore) -> Result<Step> {
        match action {
            0 => self.position -= 1,
            1 => self.position += 1,
            _ => {
                return Err(DqnError::InvalidAction {
                    action,
                    action_count: 2,
                })
            }
        }
        let (reward, terminal) = match self.position {
            0 => (-1.0, true),
            p if p == Self::CELLS - 1 => (1.0, true),
            _ => (-0.01, false),
        };
        Ok(Step {
            next_state: self.observation(),
            reward,
            terminal,
        })
    }
}

/// Noisy observations drawn from the agent's generator.
struct NoisyCorridor {
    inner: Corridor,
}

impl Environment for NoisyCorridor {
    fn state_dimension(&self) -> usize {
        self.inner.state_dimension()
    }

    fn action_count(&self) -> usize {
        self.inner.action_count()
    }

    fn reset(&mut self, rng: &mut dyn RngCore) -> Result<Array1<f32>> {
        let state = self.inner.reset(rng)?;
        Ok(state.mapv(|v| v + rng.gen_range(-0.01..0.01)))
    }

    fn step(&mut self, action: usize, rng: &mut dyn RngCore) -> Result<Step> {
        let mut step = self.inner.step(action, rng)?;
        step.next_state.mapv_inplace(|v| v + rng.gen_range(-0.01..0.01));
        Ok(step)
    }
}

fn corridor_config() -> DqnConfig {
    DqnConfig::default()
        .hidden_sizes(&[32, 32])
        .learning_rate(0.005)
        .gamma(0.9)
        .batch_size(16)
        .buffer_capacity(2000)
        .update_coeff(5)
        .episode_count(150)
        .max_steps(20)
        .epsilon(1.0, 0.05, 0.03)
        .seed(7)
}

#[test]
fn test_end_to_end_training() {
    let mut env = Corridor::new();
    let mut agent = DqnAgent::new(corridor_config(), Corridor::CELLS, 2).unwrap();

    let history = agent.train(&mut env).unwrap();
    assert_eq!(history.len(), 150);
    assert_eq!(agent.episodes(), 150);
    assert!(history.iter().all(|s| s.steps >= 2 && s.steps <= 20));
    assert!((history[149].epsilon - 0.05).abs() < 1e-6);

    // The greedy policy reaches the rewarding end; walking right twice scores 0.99
    let reward = agent.evaluate_greedy(&mut env, 20).unwrap();
    assert!(reward > 0.5, "greedy reward {}", reward);

    let metrics = agent.metrics();
    assert_eq!(metrics.episode_count(), 150);
    assert!(metrics.total_updates() > 0);
    assert!(metrics.avg_loss(50).unwrap().is_finite());
    assert!(metrics.avg_episode_reward(20).unwrap() > 0.0);
}

#[test]
fn test_training_is_reproducible() {
    let run = |seed: u64| {
        let mut env = NoisyCorridor { inner: Corridor::new() };
        let config = corridor_config().episode_count(20).seed(seed);
        let mut agent = DqnAgent::new(config, Corridor::CELLS, 2).unwrap();
        let history = agent.train(&mut env).unwrap();
        (history, agent.policy().clone())
    };

    let (history_a, policy_a) = run(11);
    let (history_b, policy_b) = run(11);
    assert_eq!(history_a, history_b);
    assert_eq!(policy_a, policy_b);

    let (_, policy_c) = run(12);
    assert_ne!(policy_a, policy_c);
}

#[test]
fn test_checkpoint_resume() {
    let dir = tempfile::tempdir().unwrap();
    let policy_path = dir.path().join("trained_corridor.bin");
    let config_path = dir.path().join("dqn.yaml");
    let metrics_path = dir.path().join("metrics.json");

    let config = corridor_config().optimizer(OptimizerConfig::Sgd).episode_count(30);
    config.save(&config_path).unwrap();

    let mut env = Corridor::new();
    let mut agent = DqnAgent::new(config, Corridor::CELLS, 2).unwrap();
    agent.train(&mut env).unwrap();
    agent.save_policy(&policy_path).unwrap();
    agent.metrics().save(&metrics_path).unwrap();

    // A new process: config from YAML, parameters from the checkpoint
    let loaded_config = DqnConfig::load(&config_path).unwrap();
    assert_eq!(&loaded_config, agent.config());
    let mut restored = DqnAgent::new(loaded_config.seed(99), Corridor::CELLS, 2).unwrap();
    restored.load_policy(&policy_path).unwrap();
    assert_eq!(restored.policy(), agent.policy());
    assert_eq!(restored.target(), agent.policy());

    for position in 1..Corridor::CELLS - 1 {
        let state = Corridor { position }.observation();
        assert_eq!(
            restored.greedy_action(state.view()).unwrap(),
            agent.greedy_action(state.view()).unwrap()
        );
    }

    let mut tracker = MetricsTracker::default();
    tracker.load(&metrics_path).unwrap();
    assert_eq!(tracker.metrics().episodes.len(), 30);
    assert_eq!(tracker.episode_count(), 30);
}

#[test]
fn test_stop_from_another_thread() {
    let stop = StopSignal::new();
    let remote = stop.clone();
    std::thread::spawn(move || remote.stop()).join().unwrap();

    let mut agent = DqnAgent::new(corridor_config(), Corridor::CELLS, 2).unwrap();
    let history = agent.train_until(&mut Corridor::new(), &stop).unwrap();
    assert!(history.is_empty());
}

#[test]
fn test_boxed_environment() {
    let mut env: Box<dyn Environment> = Box::new(Corridor::new());
    let mut agent = DqnAgent::new(corridor_config().episode_count(3), Corridor::CELLS, 2).unwrap();
    let history = agent.train(&mut env).unwrap();
    assert_eq!(history.len(), 3);
}
