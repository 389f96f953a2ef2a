use std::fmt;

use serde::{Deserialize, Serialize};

/// Which searches a calculation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    Series,
    Parallel,
    #[default]
    Both,
}

impl ConnectionMode {
    pub fn includes_series(self) -> bool {
        matches!(self, ConnectionMode::Series | ConnectionMode::Both)
    }

    pub fn includes_parallel(self) -> bool {
        matches!(self, ConnectionMode::Parallel | ConnectionMode::Both)
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Series => write!(f, "series"),
            ConnectionMode::Parallel => write!(f, "parallel"),
            ConnectionMode::Both => write!(f, "both"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("Target must be a positive finite resistance, got {0}")]
    InvalidTarget(f64),
    #[error("Tolerance must be a finite, non-negative percentage, got {0}")]
    InvalidTolerance(f64),
    #[error("Maximum combination size must be at least 1")]
    InvalidMaxSize,
}

/// Everything a calculation needs besides the resistor list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchParameters {
    /// Target resistance in ohms
    pub target: f64,
    /// Maximum relative error, in percent
    pub tolerance: f64,
    pub max_size: usize,
    pub mode: ConnectionMode,
    /// Allow a single input position to appear several times in one combination
    #[serde(default)]
    pub allow_repeats: bool,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            target: 1500.0,
            tolerance: 5.0,
            max_size: 3,
            mode: ConnectionMode::Both,
            allow_repeats: false,
        }
    }
}

impl SearchParameters {
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.target.is_finite() || self.target <= 0.0 {
            return Err(SearchError::InvalidTarget(self.target));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SearchError::InvalidTolerance(self.tolerance));
        }
        if self.max_size == 0 {
            return Err(SearchError::InvalidMaxSize);
        }
        Ok(())
    }
}
