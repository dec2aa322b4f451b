//! Secondary Extinctions
//!
//! A single cascade step: force a set of species extinct, let the community re-equilibrate
//! and report which other species did not survive. [`robustness`](super::robustness::robustness)
//! repeats this step along random extinction sequences.

use std::collections::BTreeSet;

use log::debug;

use crate::{
    analysis::{error::AnalysisError, growth::check_biomass, selection::SpeciesSelection},
    model::EcologicalModel,
    simulation::simulator::Simulator,
};

/// Default biomass at or below which a species counts as extinct.
pub const DEFAULT_EXTINCTION_THRESHOLD: f64 = 1e-6;

/// Default horizon of every re-equilibration.
pub const DEFAULT_HORIZON: f64 = 1000.0;

/// Species that go extinct after removing `extinct_species` from `biomass`.
///
/// Copies `biomass`, zeroes the removed species, simulates until `t_end` and collects the
/// species other than the removed ones whose terminal biomass is at or below `threshold`.
///
/// # Arguments
///
/// * `model` - The ecological model
/// * `simulator` - Simulator used to re-equilibrate the community
/// * `extinct_species` - Species forced extinct, a single index or a set of indices
/// * `biomass` - Starting biomass vector, usually an equilibrium
/// * `t_end` - Simulation horizon, `1000` by default
/// * `threshold` - Extinction threshold, `1e-6` by default
///
/// # Returns
///
/// The indices of the secondary extinctions, or an error if the input is invalid or the
/// simulation fails.
///
/// # Examples
///
/// ```
/// use ecostability::prelude::*;
///
/// // Species 1 consumes species 0
/// let web = FoodWeb::builder()
///     .attack_rates(vec![vec![0.0, 0.0], vec![1.0, 0.0]])
///     .build()
///     .unwrap();
///
/// let lost = secondary_extinctions()
///     .model(&web)
///     .simulator(&OdeSimulator::default())
///     .extinct_species(0usize)
///     .biomass(&[0.2, 0.8])
///     .call()
///     .unwrap();
///
/// assert_eq!(lost.into_iter().collect::<Vec<_>>(), vec![1]);
/// ```
#[bon::builder]
pub fn secondary_extinctions<M: EcologicalModel, S: Simulator>(
    model: &M,
    simulator: &S,
    #[builder(into)] extinct_species: SpeciesSelection,
    biomass: &[f64],
    #[builder(default = DEFAULT_HORIZON)] t_end: f64,
    #[builder(default = DEFAULT_EXTINCTION_THRESHOLD)] threshold: f64,
) -> Result<BTreeSet<usize>, AnalysisError> {
    check_biomass(model, biomass)?;
    check_horizon(t_end)?;
    check_threshold(threshold)?;
    let removed = extinct_species.resolve(model.richness())?;

    let terminal = cascade(model, simulator, biomass, &removed, t_end, threshold)?;

    let lost = terminal
        .iter()
        .enumerate()
        .filter(|(i, b)| **b == 0.0 && !removed.contains(i))
        .map(|(i, _)| i)
        .collect::<BTreeSet<_>>();

    debug!("Removing {removed:?} caused secondary extinctions {lost:?}");
    Ok(lost)
}

/// Zeroes `removed` in a copy of `biomass`, simulates until `t_end` and floors every
/// terminal biomass at or below `threshold` to zero.
pub(crate) fn cascade<M: EcologicalModel, S: Simulator>(
    model: &M,
    simulator: &S,
    biomass: &[f64],
    removed: &[usize],
    t_end: f64,
    threshold: f64,
) -> Result<Vec<f64>, AnalysisError> {
    let mut initial = biomass.to_vec();
    for i in removed {
        initial[*i] = 0.0;
    }

    let trajectory = simulator.simulate(model, &initial, t_end)?;
    Ok(floor_extinct(trajectory.final_state(), threshold))
}

pub(crate) fn floor_extinct(state: &[f64], threshold: f64) -> Vec<f64> {
    state
        .iter()
        .map(|b| if *b <= threshold { 0.0 } else { *b })
        .collect()
}

pub(crate) fn check_horizon(t_end: f64) -> Result<(), AnalysisError> {
    if !t_end.is_finite() || t_end <= 0.0 {
        return Err(AnalysisError::InvalidArgument(format!(
            "simulation horizon must be positive, got {t_end}"
        )));
    }
    Ok(())
}

pub(crate) fn check_threshold(threshold: f64) -> Result<(), AnalysisError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(AnalysisError::InvalidArgument(format!(
            "extinction threshold must be non-negative, got {threshold}"
        )));
    }
    Ok(())
}
