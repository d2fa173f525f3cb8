//! Fatal error types for simulation setup and execution.

use thiserror::Error;

use crate::config::ConfigError;

/// Error raised when a simulation cannot start or cannot proceed.
///
/// Recoverable conditions (out-of-range power requests, start/stop misuse,
/// surplus load shed) are not errors; they are logged via `tracing` and the
/// affected component holds its prior state.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid static configuration, rejected before the run starts.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed input series row; the run aborts at this row.
    #[error("data error at row {row}: {message}")]
    Data { row: usize, message: String },
}

impl SimError {
    /// Convenience constructor for a row-indexed data error.
    pub fn data(row: usize, message: impl Into<String>) -> Self {
        Self::Data {
            row,
            message: message.into(),
        }
    }
}
