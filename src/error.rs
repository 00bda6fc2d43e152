use thiserror::Error;

/// Result type for deepq operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the deepq library
#[derive(Debug, Error)]
pub enum DqnError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Action index outside of the action space
    #[error("Invalid action {action}: must be less than {action_count}")]
    InvalidAction { action: usize, action_count: usize },

    /// Not enough stored transitions to draw a batch
    #[error("Insufficient data: requested {requested} transitions, {available} available")]
    InsufficientData { requested: usize, available: usize },

    /// Failure reported by the environment
    #[error("Environment error: {0}")]
    Environment(String),

    /// Non-finite loss or parameters
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Metrics export errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file errors
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn environment<S: Into<String>>(msg: S) -> Self {
        DqnError::Environment(msg.into())
    }

    /// Whether the caller may simply skip the current round and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DqnError::InsufficientData { .. })
    }
}
