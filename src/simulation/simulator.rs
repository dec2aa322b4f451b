//! Forward simulation of population-dynamics models.
//!
//! The analysis routines only ever talk to the [`Simulator`] trait: given a model and an
//! initial biomass vector they need a [`Trajectory`] ending at a requested time. The
//! default implementation, [`OdeSimulator`](super::ode::OdeSimulator), integrates the
//! model's growth rates with a peroxide ODE integrator.

use crate::model::EcologicalModel;

use super::{error::SimulationError, trajectory::Trajectory};

/// Something that can run a model forward in time.
pub trait Simulator: Sync {
    /// Simulates `model` from `initial` until `t_end`.
    ///
    /// # Arguments
    ///
    /// * `model` - The model to integrate
    /// * `initial` - Initial biomass vector, one entry per species
    /// * `t_end` - End time of the simulation
    ///
    /// # Returns
    ///
    /// Returns the simulated [`Trajectory`] or a [`SimulationError`].
    fn simulate<M: EcologicalModel>(
        &self,
        model: &M,
        initial: &[f64],
        t_end: f64,
    ) -> Result<Trajectory, SimulationError>;
}

/// Checks that an initial biomass vector fits the model and is biologically valid.
pub(crate) fn validate_initial<M: EcologicalModel>(
    model: &M,
    initial: &[f64],
) -> Result<(), SimulationError> {
    if initial.len() != model.richness() {
        return Err(SimulationError::BiomassLengthMismatch {
            expected: model.richness(),
            found: initial.len(),
        });
    }

    if let Some((species, value)) = initial
        .iter()
        .enumerate()
        .find(|(_, b)| !b.is_finite() || **b < 0.0)
    {
        return Err(SimulationError::InvalidBiomass {
            species,
            value: *value,
        });
    }

    Ok(())
}
