//! Setup-time error types.
//!
//! Gameplay itself never fails: rejected damage comes back as an invalid
//! [`DamageResult`](crate::sim::DamageResult) and stale ids resolve to `None`.
//! Errors here cover the places a caller can get wrong while building a
//! session: tuning files and player management.

use std::fmt;

#[derive(Debug)]
pub enum SimError {
    /// The local player cap was reached.
    TooManyPlayers {
        /// Maximum number of concurrent players.
        max: usize,
    },

    /// A ship id did not resolve in the registry.
    UnknownShip { id: u32 },

    /// A controller id did not resolve.
    UnknownController { id: u32 },

    /// A tuning value is outside its valid range.
    InvalidTuning {
        /// Dotted path of the offending field (for logging).
        field: &'static str,
        value: f32,
    },

    /// Tuning JSON could not be parsed.
    TuningParse(serde_json::Error),

    /// Tuning file could not be read.
    TuningIo(std::io::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::TooManyPlayers { max } => {
                write!(f, "cannot create more than {} players", max)
            }
            SimError::UnknownShip { id } => write!(f, "ship {} is not registered", id),
            SimError::UnknownController { id } => write!(f, "controller {} does not exist", id),
            SimError::InvalidTuning { field, value } => {
                write!(f, "tuning value '{}' = {} must be positive", field, value)
            }
            SimError::TuningParse(err) => write!(f, "failed to parse tuning: {}", err),
            SimError::TuningIo(err) => write!(f, "failed to read tuning file: {}", err),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::TuningParse(err) => Some(err),
            SimError::TuningIo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::TuningParse(err)
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::TuningIo(err)
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
