//! Core error types for script emission
//!
//! Every fallible operation in the crate reports one of these variants. Errors are
//! raised by the call that detected them; text already written to a sink stays written.

use thiserror::Error;

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PlotError>;

/// Core error types for building and emitting gnuplot scripts
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Invalid column count: {cols} (a data buffer needs at least one column)")]
    InvalidColumnCount { cols: usize },

    #[error("Row size mismatch: expected {expected} values, got {actual}")]
    RowSizeMismatch { expected: usize, actual: usize },

    #[error("Length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Errorbar plot requires errors on at least one axis")]
    MissingErrors,

    #[error("Error vector length mismatch on {axis} axis: {len} values for {points} points")]
    ErrorLengthMismatch {
        axis: &'static str,
        len: usize,
        points: usize,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Usage error: {message}")]
    Usage { message: String },

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {message} at line {line}")]
    Parse { message: String, line: usize },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PlotError {
    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new usage error
    pub fn usage_error(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
        }
    }

    /// Create a new spawn error
    pub fn spawn_error(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Returns true for errors caused by inconsistent data shapes
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::RowSizeMismatch { .. }
                | Self::LengthMismatch { .. }
                | Self::MissingErrors
                | Self::ErrorLengthMismatch { .. }
        )
    }
}
