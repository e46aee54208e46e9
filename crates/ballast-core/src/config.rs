use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_gravity() -> f64 {
    9.81
}
const fn default_com_height() -> f64 {
    1.0
}
const fn default_true() -> bool {
    true
}
const fn default_split_duration() -> f64 {
    0.05
}

// ---------------------------------------------------------------------------
// PlannerConfig
// ---------------------------------------------------------------------------

/// Configuration for the CoM trajectory planner.
///
/// Plain value struct passed at construction; there is no live registry.
/// Loadable from TOML with per-field defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Gravitational acceleration magnitude in m/s^2 (default: 9.81).
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Nominal CoM height above the pressure centroid in meters (default: 1.0).
    ///
    /// Sets the pendulum natural frequency `omega = sqrt(gravity / com_height)`
    /// unless [`natural_frequency`](Self::natural_frequency) overrides it.
    #[serde(default = "default_com_height")]
    pub com_height: f64,

    /// Natural frequency in rad/s, supplied directly instead of the height.
    ///
    /// When set, `com_height` is ignored for the dynamics (the effective
    /// pendulum length becomes `gravity / omega^2`).
    #[serde(default)]
    pub natural_frequency: Option<f64>,

    /// Reproduce the measured CoM velocity at the start of the trajectory
    /// (default: true).
    ///
    /// Requires splitting the first load-bearing phase into a short
    /// sub-phase plus remainder so that both position and velocity can be
    /// constrained without over-determining the first segment.
    #[serde(default = "default_true")]
    pub maintain_initial_velocity: bool,

    /// Duration of the synthetic continuity sub-phase in seconds
    /// (default: 0.05). Capped at half the first phase's duration.
    #[serde(default = "default_split_duration")]
    pub velocity_split_duration: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            com_height: default_com_height(),
            natural_frequency: None,
            maintain_initial_velocity: true,
            velocity_split_duration: default_split_duration(),
        }
    }
}

impl PlannerConfig {
    /// Load a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() || self.gravity <= 0.0 {
            return Err(ConfigError::InvalidGravity(self.gravity));
        }
        if !self.com_height.is_finite() || self.com_height <= 0.0 {
            return Err(ConfigError::InvalidComHeight(self.com_height));
        }
        if let Some(omega) = self.natural_frequency {
            if !omega.is_finite() || omega <= 0.0 {
                return Err(ConfigError::InvalidNaturalFrequency(omega));
            }
        }
        if !self.velocity_split_duration.is_finite() || self.velocity_split_duration <= 0.0 {
            return Err(ConfigError::InvalidSplitDuration(self.velocity_split_duration));
        }
        Ok(())
    }

    /// Pendulum natural frequency in rad/s.
    pub fn omega(&self) -> f64 {
        self.natural_frequency
            .unwrap_or_else(|| (self.gravity / self.com_height).sqrt())
    }

    /// Effective pendulum length `gravity / omega^2` in meters.
    ///
    /// Equals `com_height` unless the natural frequency was supplied directly.
    pub fn pendulum_height(&self) -> f64 {
        let omega = self.omega();
        self.gravity / (omega * omega)
    }
}
