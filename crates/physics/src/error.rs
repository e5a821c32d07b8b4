//! Error types for motor setup.
//!
//! Per-tick solving never fails: geometric edge cases degrade numerically.
//! Everything here is reported once, when a body or configuration is built.

use thiserror::Error;

/// Errors raised while loading or validating a [`SolverConfig`](crate::SolverConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while constructing a body or motor.
#[derive(Debug, Error)]
pub enum MotorError {
    #[error("degenerate body shape: half extents {0:?} must be finite and positive")]
    DegenerateShape([f32; 3]),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
