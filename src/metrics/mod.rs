pub mod tracker;

pub use tracker::{EpisodeStats, MetricsTracker, TrainingMetrics};
