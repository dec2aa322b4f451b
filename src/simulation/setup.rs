//! Setup module for configuring forward simulations.
//!
//! This module provides the [`SimulationSetup`] struct and its builder for configuring
//! the numerical integration of a population-dynamics model. It handles:
//!
//! - Time range specification (start time and default horizon)
//! - Integration step size
//! - An optional extinction threshold applied to every stored state

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Configuration for numerical integration of a population-dynamics model
///
/// # Fields
///
/// * `t0` - Start time of the simulation (default: 0.0)
/// * `t_end` - Default end time of the simulation (default: 1000.0)
/// * `dt` - Integration step size (default: 0.1)
/// * `extinction_threshold` - Biomass below which a species is set to zero (default: None)
///
/// # Examples
///
/// ```
/// use ecostability::prelude::SimulationSetupBuilder;
///
/// let setup = SimulationSetupBuilder::default()
///     .t_end(500.0)
///     .dt(0.05)
///     .extinction_threshold(1e-6)
///     .build()
///     .unwrap();
///
/// assert_eq!(setup.t0, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SimulationSetup {
    #[builder(default = "0.0")]
    pub t0: f64,
    #[builder(default = "1000.0")]
    pub t_end: f64,
    #[builder(default = "0.1")]
    pub dt: f64,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub extinction_threshold: Option<f64>,
}

impl Default for SimulationSetup {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t_end: 1000.0,
            dt: 0.1,
            extinction_threshold: None,
        }
    }
}

impl SimulationSetup {
    /// Checks that the time span, step size and threshold describe a valid integration.
    ///
    /// Setups built through [`SimulationSetupBuilder`] are validated on `build()`; this is
    /// the equivalent check for deserialized or hand-assembled setups.
    pub fn validate(&self) -> Result<(), SimulationError> {
        check_setup(self.t0, self.t_end, self.dt, self.extinction_threshold)
            .map_err(SimulationError::InvalidSetup)
    }
}

impl SimulationSetupBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = SimulationSetup::default();
        check_setup(
            self.t0.unwrap_or(defaults.t0),
            self.t_end.unwrap_or(defaults.t_end),
            self.dt.unwrap_or(defaults.dt),
            self.extinction_threshold.flatten(),
        )
    }
}

fn check_setup(t0: f64, t_end: f64, dt: f64, threshold: Option<f64>) -> Result<(), String> {
    if !t0.is_finite() || !t_end.is_finite() {
        return Err(format!("time span must be finite, got ({t0}, {t_end})"));
    }
    if t_end <= t0 {
        return Err(format!("t_end ({t_end}) must be greater than t0 ({t0})"));
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(format!("dt must be positive, got {dt}"));
    }
    if let Some(threshold) = threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(format!(
                "extinction threshold must be non-negative, got {threshold}"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let setup = SimulationSetupBuilder::default().build().unwrap();
        assert_eq!(setup, SimulationSetup::default());
    }

    #[test]
    fn test_builder_rejects_reversed_span() {
        let result = SimulationSetupBuilder::default()
            .t0(10.0)
            .t_end(5.0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_zero_step() {
        let result = SimulationSetupBuilder::default().dt(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_deserialized() {
        let setup: SimulationSetup =
            serde_json::from_str(r#"{"t0": 0.0, "t_end": -1.0, "dt": 0.1}"#).unwrap();
        assert!(matches!(
            setup.validate(),
            Err(SimulationError::InvalidSetup(_))
        ));
    }
}
