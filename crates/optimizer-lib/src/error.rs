//! Error taxonomy for the recommendation pipeline

use thiserror::Error;

/// Errors raised by the pipeline and its collaborators
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// Upstream fetch failed; aborts the run
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream payload is missing expected fields or is malformed
    #[error("malformed upstream data: {0}")]
    DataShape(String),

    /// Missing or invalid settings, raised at startup
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Alert dispatch failed
    #[error("notification failed: {0}")]
    Notification(String),
}

impl OptimizerError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn data_shape(msg: impl Into<String>) -> Self {
        Self::DataShape(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizerError::Transport(_) => "transport",
            OptimizerError::DataShape(_) => "data_shape",
            OptimizerError::Configuration(_) => "configuration",
            OptimizerError::Notification(_) => "notification",
        }
    }
}

impl From<serde_json::Error> for OptimizerError {
    fn from(err: serde_json::Error) -> Self {
        OptimizerError::DataShape(err.to_string())
    }
}

impl From<std::io::Error> for OptimizerError {
    fn from(err: std::io::Error) -> Self {
        OptimizerError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
