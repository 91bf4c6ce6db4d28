use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;
use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type used across the initialization crate.
pub type Result<T> = std::result::Result<T, InitErr>;

/// The initialization error type.
#[derive(Debug)]
pub enum InitErr {
    /// A shape descriptor is invalid (negative extent or too many dimensions).
    InvalidShape(String),

    /// A scheme parameter is outside of its domain.
    InvalidParameter {
        /// Name of the offending argument (e.g. "fan_in", "stdv").
        what: &'static str,
        /// Observed value.
        value: f64,
        /// Human-readable constraint that was violated.
        reason: &'static str,
    },

    /// Propagated unchanged from the array/rng backend.
    Backend(String),

    /// A configuration document could not be understood.
    InvalidConfig(String),
}

impl InitErr {
    pub(crate) fn param(what: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            what,
            value,
            reason,
        }
    }
}

impl Display for InitErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitErr::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            InitErr::InvalidParameter {
                what,
                value,
                reason,
            } => write!(f, "invalid parameter {what} = {value}: {reason}"),
            InitErr::Backend(msg) => write!(f, "backend failure: {msg}"),
            InitErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for InitErr {}

impl From<NormalError> for InitErr {
    fn from(value: NormalError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<UniformError> for InitErr {
    fn from(value: UniformError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<ShapeError> for InitErr {
    fn from(value: ShapeError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<serde_json::Error> for InitErr {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}
