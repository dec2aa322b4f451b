use thiserror::Error;

use crate::simulation::error::SimulationError;

/// Errors raised by the stability, sensitivity and extinction analyses.
///
/// Input validation always fails with [`AnalysisError::InvalidArgument`] before any
/// simulation or linear algebra is attempted. A singular interaction matrix is reported
/// as [`AnalysisError::SingularSystem`] so callers can tell it apart from solver failures,
/// which surface as [`AnalysisError::NumericalInstability`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The interaction matrix cannot be inverted.
    #[error("Interaction matrix is singular (reciprocal condition number {rcond:e})")]
    SingularSystem { rcond: f64 },

    /// An eigenvalue or inversion routine failed or produced non-finite values.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    /// A robustness trial failed; `step` is the position in its extinction sequence.
    #[error("Robustness trial {trial} failed at step {step}: {source}")]
    TrialFailed {
        trial: usize,
        step: usize,
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Returns true if the error, or the error that aborted a trial, is a singular system.
    pub fn is_singular(&self) -> bool {
        match self {
            AnalysisError::SingularSystem { .. } => true,
            AnalysisError::TrialFailed { source, .. } => source.is_singular(),
            _ => false,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, AnalysisError::InvalidArgument(_))
    }
}
