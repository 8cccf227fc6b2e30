//! Visualizer error types
//!
//! The touch path itself never fails; these errors come from hooking the host,
//! building a timer backend and loading replay traces.

use thiserror::Error;

/// Errors that can occur while setting up or feeding the visualizer
#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("Interception unavailable: {0}")]
    InterceptionUnavailable(String),

    #[error("No async runtime available for fade timers")]
    NoRuntime,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trace parse error: {0}")]
    Trace(#[from] serde_json::Error),

    #[error("Invalid trace: {0}")]
    InvalidTrace(String),
}

/// Result type for visualizer setup operations
pub type VisualizerResult<T> = Result<T, VisualizerError>;
