use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Telemetry of one finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode: usize,
    pub total_reward: f32,
    /// Epsilon after this episode's decay.
    pub epsilon: f32,
    pub steps: usize,
    /// Mean loss of the updates run during the episode, if any ran.
    pub mean_loss: Option<f32>,
}

/// Stores training metrics over time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Loss values over time
    pub losses: VecDeque<f32>,

    /// Gradient norms before clipping
    pub gradient_norms: VecDeque<f32>,

    /// Finished episodes
    pub episodes: VecDeque<EpisodeStats>,
}

/// Tracks metrics during training, keeping the most recent `history_size` entries of each series.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,
    total_steps: usize,
    total_updates: usize,
}

fn push_bounded<T>(series: &mut VecDeque<T>, value: T, history_size: usize) {
    if series.len() >= history_size {
        series.pop_front();
    }
    series.push_back(value);
}

fn truncate_front<T>(series: &mut VecDeque<T>, history_size: usize) {
    while series.len() > history_size {
        series.pop_front();
    }
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics::default(),
            history_size: history_size.max(1),
            total_steps: 0,
            total_updates: 0,
        }
    }

    /// Record one gradient update
    pub fn record_update(&mut self, loss: f32, gradient_norm: f32) {
        push_bounded(&mut self.metrics.losses, loss, self.history_size);
        push_bounded(&mut self.metrics.gradient_norms, gradient_norm, self.history_size);
        self.total_updates += 1;
    }

    /// Record one environment step
    pub fn record_step(&mut self) {
        self.total_steps += 1;
    }

    /// Record a finished episode
    pub fn record_episode(&mut self, stats: EpisodeStats) {
        push_bounded(&mut self.metrics.episodes, stats, self.history_size);
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.metrics.episodes.back().map_or(0, |e| e.episode + 1)
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    /// Get recent average loss
    pub fn avg_loss(&self, window: usize) -> Option<f32> {
        let n = window.min(self.metrics.losses.len());
        if n == 0 {
            return None;
        }
        let sum: f32 = self.metrics.losses.iter().rev().take(n).sum();
        Some(sum / n as f32)
    }

    /// Get recent average episode reward
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        let n = window.min(self.metrics.episodes.len());
        if n == 0 {
            return None;
        }
        let sum: f32 = self.metrics.episodes.iter().rev().take(n).map(|e| e.total_reward).sum();
        Some(sum / n as f32)
    }

    /// Clear all metrics
    pub fn clear(&mut self) {
        self.metrics = TrainingMetrics::default();
        self.total_steps = 0;
        self.total_updates = 0;
    }

    /// Save metrics to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.metrics)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics from a JSON file.
    ///
    /// Series longer than `history_size` keep only their newest entries. The
    /// totals are rebuilt from the saved series, so they only count what the
    /// file still holds.
    pub fn load(&mut self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        let data = std::fs::read_to_string(path)?;
        let mut metrics: TrainingMetrics = serde_json::from_str(&data)?;

        self.total_updates = metrics.losses.len();
        self.total_steps = metrics.episodes.iter().map(|e| e.steps).sum();

        truncate_front(&mut metrics.losses, self.history_size);
        truncate_front(&mut metrics.gradient_norms, self.history_size);
        truncate_front(&mut metrics.episodes, self.history_size);
        self.metrics = metrics;
        Ok(())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}
