//! Simulation Trajectory Module
//!
//! This module provides [`Trajectory`], the biomass time series returned by a
//! [`Simulator`](super::simulator::Simulator), together with the small extraction helpers
//! the analysis routines use to read it (terminal state, extinct and surviving species).

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Biomass of every species over time.
///
/// Row `k` of `biomass` is the state at `times[k]`. A trajectory always holds at least
/// one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    times: Vec<f64>,
    biomass: Vec<Vec<f64>>,
}

impl Trajectory {
    /// Creates a trajectory from time points and the corresponding states.
    ///
    /// # Arguments
    ///
    /// * `times` - Time points of the stored states
    /// * `biomass` - One biomass vector per time point, all of equal length
    ///
    /// # Returns
    ///
    /// Returns the trajectory, or a [`SimulationError`] if it is empty or ragged.
    pub fn new(times: Vec<f64>, biomass: Vec<Vec<f64>>) -> Result<Self, SimulationError> {
        if times.is_empty() || biomass.is_empty() {
            return Err(SimulationError::EmptyTrajectory);
        }
        if times.len() != biomass.len() {
            return Err(SimulationError::InvalidSetup(format!(
                "trajectory has {} time points but {} states",
                times.len(),
                biomass.len()
            )));
        }

        let richness = biomass[0].len();
        if let Some(row) = biomass.iter().find(|row| row.len() != richness) {
            return Err(SimulationError::BiomassLengthMismatch {
                expected: richness,
                found: row.len(),
            });
        }

        Ok(Self { times, biomass })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[Vec<f64>] {
        &self.biomass
    }

    /// Number of stored time points.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of species in each state.
    pub fn richness(&self) -> usize {
        self.final_state().len()
    }

    /// Biomass vector at the last time point.
    pub fn final_state(&self) -> &[f64] {
        self.biomass.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn final_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(f64::NAN)
    }

    /// Biomass time series of a single species, or `None` if the index is out of range.
    pub fn species(&self, i: usize) -> Option<Vec<f64>> {
        if i >= self.richness() {
            return None;
        }
        Some(self.biomass.iter().map(|row| row[i]).collect())
    }

    /// Trajectory as a `(time points × species)` matrix.
    pub fn as_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), self.richness()), |(t, i)| self.biomass[t][i])
    }

    /// Summed biomass of all species at every time point.
    pub fn total_biomass(&self) -> Vec<f64> {
        self.biomass.iter().map(|row| row.iter().sum()).collect()
    }

    /// Species whose terminal biomass is at or below `threshold`.
    pub fn extinct_species(&self, threshold: f64) -> BTreeSet<usize> {
        self.final_state()
            .iter()
            .enumerate()
            .filter(|(_, b)| **b <= threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Species whose terminal biomass is above `threshold`.
    pub fn surviving_species(&self, threshold: f64) -> BTreeSet<usize> {
        self.final_state()
            .iter()
            .enumerate()
            .filter(|(_, b)| **b > threshold)
            .map(|(i, _)| i)
            .collect()
    }
}
