//! Simulation Error Module
//!
//! This module provides the error type returned by the simulation collaborator.
//!
//! # Key Error Types
//!
//! The [`SimulationError`] enum covers the failure points of a forward simulation:
//! - Invalid simulation setups (time span, step size, thresholds)
//! - Initial biomass vectors of the wrong length or with invalid entries
//! - ODE integration errors reported by the solver
//! - Non-finite states produced during integration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid simulation setup: {0}")]
    InvalidSetup(String),
    #[error("Biomass vector has {found} entries, expected {expected}")]
    BiomassLengthMismatch { expected: usize, found: usize },
    #[error("Invalid biomass {value} for species {species}")]
    InvalidBiomass { species: usize, value: f64 },
    #[error("ODE integration failed: {0}")]
    IntegrationError(String),
    #[error("Non-finite biomass for species {species} at t = {time}")]
    NonFiniteState { species: usize, time: f64 },
    #[error("Simulation produced an empty trajectory")]
    EmptyTrajectory,
}
