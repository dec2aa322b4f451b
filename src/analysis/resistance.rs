//! Resistance to Press Perturbations
//!
//! Resistance measures how the equilibrium biomass of a set of species responds to a
//! sustained increase of mortality.
//!
//! # Key Components
//!
//! - [`resistance`]: Linear estimate from the sensitivity matrix, valid for small increments
//! - [`resistance_simulation`]: Empirical estimate obtained by re-simulating a perturbed clone
//!   of the model, capturing the nonlinear response to larger increments
//! - [`Resistance`] and [`SimulatedResistance`]: Per-species or aggregated results
//!
//! Both estimates share the same sign convention: the reported value is the biomass change
//! per unit mortality increase, so for small increments `ε` the empirical estimate converges
//! to the analytic one.

use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{model::EcologicalModel, simulation::simulator::Simulator};

use super::{
    error::AnalysisError, growth::check_biomass, selection::SpeciesSelection,
    sensitivity::sensitivity_matrix,
};

/// Default mortality increment applied to every species by [`resistance_simulation`].
pub const DEFAULT_MORTALITY_INCREMENT: f64 = 0.1;

/// Analytic resistance, per response species or summed over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resistance {
    PerSpecies(Vec<f64>),
    Aggregated(f64),
}

impl Resistance {
    /// Sum over all response species.
    pub fn total(&self) -> f64 {
        match self {
            Resistance::PerSpecies(values) => values.iter().sum(),
            Resistance::Aggregated(value) => *value,
        }
    }

    pub fn per_species(&self) -> Option<&[f64]> {
        match self {
            Resistance::PerSpecies(values) => Some(values),
            Resistance::Aggregated(_) => None,
        }
    }
}

/// Empirical response of a single entry.
///
/// A normalized response to a zero mortality increment is a division by zero and is
/// reported as [`SpeciesResponse::Undefined`] instead of `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesResponse {
    Defined(f64),
    Undefined,
}

impl SpeciesResponse {
    pub fn value(&self) -> Option<f64> {
        match self {
            SpeciesResponse::Defined(value) => Some(*value),
            SpeciesResponse::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, SpeciesResponse::Undefined)
    }
}

/// Result of [`resistance_simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulatedResistance {
    PerSpecies(Vec<SpeciesResponse>),
    Aggregated(SpeciesResponse),
}

impl SimulatedResistance {
    /// Sum over the defined entries, `None` if any entry is undefined.
    pub fn total(&self) -> Option<f64> {
        match self {
            SimulatedResistance::PerSpecies(values) => {
                values.iter().map(SpeciesResponse::value).sum()
            }
            SimulatedResistance::Aggregated(value) => value.value(),
        }
    }

    pub fn per_species(&self) -> Option<&[SpeciesResponse]> {
        match self {
            SimulatedResistance::PerSpecies(values) => Some(values),
            SimulatedResistance::Aggregated(_) => None,
        }
    }
}

/// Analytic resistance of `model` at `biomass`.
///
/// Selects the block `S[response_of, perturbation_on]` of the sensitivity matrix, sums it
/// over the perturbed species and, when `aggregated` is set, over the response species as
/// well. The result is negated so that it reads as the biomass change per unit mortality
/// increase.
///
/// # Arguments
///
/// * `model` - The ecological model
/// * `biomass` - Biomass vector, usually an equilibrium
/// * `response_of` - Species whose response is reported, all species by default
/// * `perturbation_on` - Species whose mortality is increased, all species by default
/// * `aggregated` - Sum over the response species
///
/// # Returns
///
/// The [`Resistance`], [`AnalysisError::InvalidArgument`] for invalid selections and the
/// errors of [`sensitivity_matrix`].
///
/// # Examples
///
/// ```
/// use ecostability::prelude::*;
///
/// let web = FoodWeb::builder()
///     .attack_rates(vec![vec![0.0, 0.0], vec![1.0, 0.0]])
///     .build()
///     .unwrap();
///
/// let total = resistance()
///     .model(&web)
///     .biomass(&[0.2, 0.8])
///     .aggregated(true)
///     .call()
///     .unwrap();
///
/// assert!((total.total() + 1.0).abs() < 1e-6);
/// ```
#[bon::builder]
pub fn resistance<M: EcologicalModel>(
    model: &M,
    biomass: &[f64],
    #[builder(default, into)] response_of: SpeciesSelection,
    #[builder(default, into)] perturbation_on: SpeciesSelection,
    #[builder(default)] aggregated: bool,
) -> Result<Resistance, AnalysisError> {
    let n = model.richness();
    check_biomass(model, biomass)?;
    let response = response_of.resolve(n)?;
    let perturbed = perturbation_on.resolve(n)?;

    let sensitivity = sensitivity_matrix(model, biomass)?;
    Ok(resistance_from_sensitivity(
        &sensitivity,
        &response,
        &perturbed,
        aggregated,
    ))
}

/// Resistance from a precomputed sensitivity matrix and resolved index sets.
pub fn resistance_from_sensitivity(
    sensitivity: &Array2<f64>,
    response_of: &[usize],
    perturbation_on: &[usize],
    aggregated: bool,
) -> Resistance {
    let per_species: Vec<f64> = response_of
        .iter()
        .map(|r| -perturbation_on.iter().map(|p| sensitivity[[*r, *p]]).sum::<f64>())
        .collect();

    if aggregated {
        Resistance::Aggregated(per_species.iter().sum())
    } else {
        Resistance::PerSpecies(per_species)
    }
}

/// Empirical resistance of `model` at `biomass`.
///
/// Clones the model, adds `mortality_increment` to the mortality of every species,
/// re-simulates the clone from `biomass` until `t_end` and compares the terminal state with
/// `biomass`. The caller's model is never modified.
///
/// Without aggregation, each biomass change is divided by the increment of the same species
/// when `normalized` is set; a zero increment yields [`SpeciesResponse::Undefined`] for that
/// entry. With aggregation the changes are summed over `response_of` and divided by the mean
/// increment.
///
/// # Arguments
///
/// * `model` - The ecological model
/// * `biomass` - Starting biomass vector, usually an equilibrium
/// * `simulator` - Simulator used to re-equilibrate the perturbed model
/// * `mortality_increment` - One increment per species, `0.1` for every species by default
/// * `t_end` - Simulation horizon, `1000` by default
/// * `response_of` - Species whose response is reported, all species by default
/// * `aggregated` - Sum over the response species
/// * `normalized` - Divide by the mortality increment, on by default
///
/// # Returns
///
/// The [`SimulatedResistance`], [`AnalysisError::InvalidArgument`] for invalid input and
/// [`AnalysisError::Simulation`] if the simulation fails.
#[bon::builder]
pub fn resistance_simulation<M: EcologicalModel, S: Simulator>(
    model: &M,
    biomass: &[f64],
    simulator: &S,
    mortality_increment: Option<Vec<f64>>,
    #[builder(default = 1000.0)] t_end: f64,
    #[builder(default, into)] response_of: SpeciesSelection,
    #[builder(default)] aggregated: bool,
    #[builder(default = true)] normalized: bool,
) -> Result<SimulatedResistance, AnalysisError> {
    let n = model.richness();
    check_biomass(model, biomass)?;
    let response = response_of.resolve(n)?;

    if !t_end.is_finite() || t_end <= 0.0 {
        return Err(AnalysisError::InvalidArgument(format!(
            "simulation horizon must be positive, got {t_end}"
        )));
    }

    let increment = mortality_increment.unwrap_or_else(|| vec![DEFAULT_MORTALITY_INCREMENT; n]);
    if increment.len() != n {
        return Err(AnalysisError::InvalidArgument(format!(
            "mortality increment has {} entries, expected {}",
            increment.len(),
            n
        )));
    }

    let mut perturbed = model.clone();
    for (i, (mortality, delta)) in perturbed
        .mortality_mut()
        .iter_mut()
        .zip(&increment)
        .enumerate()
    {
        let updated = *mortality + delta;
        if !delta.is_finite() || updated < 0.0 {
            return Err(AnalysisError::InvalidArgument(format!(
                "mortality increment {delta} of species {i} yields invalid mortality {updated}"
            )));
        }
        *mortality = updated;
    }

    debug!("Re-simulating perturbed model with mortality increments {increment:?}");
    let trajectory = simulator.simulate(&perturbed, biomass, t_end)?;
    let terminal = trajectory.final_state();

    let delta: Vec<f64> = response
        .iter()
        .map(|i| terminal[*i] - biomass[*i])
        .collect();

    let result = match (aggregated, normalized) {
        (false, false) => SimulatedResistance::PerSpecies(
            delta.into_iter().map(SpeciesResponse::Defined).collect(),
        ),
        (false, true) => SimulatedResistance::PerSpecies(
            response
                .iter()
                .zip(delta)
                .map(|(i, change)| normalize(change, increment[*i]))
                .collect(),
        ),
        (true, false) => {
            SimulatedResistance::Aggregated(SpeciesResponse::Defined(delta.iter().sum()))
        }
        (true, true) => {
            let mean_increment = increment.iter().sum::<f64>() / n as f64;
            SimulatedResistance::Aggregated(normalize(delta.iter().sum(), mean_increment))
        }
    };

    Ok(result)
}

fn normalize(change: f64, increment: f64) -> SpeciesResponse {
    if increment == 0.0 {
        SpeciesResponse::Undefined
    } else {
        SpeciesResponse::Defined(change / increment)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;
    use crate::model::FoodWeb;

    fn chain() -> FoodWeb {
        FoodWeb::builder()
            .attack_rates(vec![vec![0.0, 0.0], vec![1.0, 0.0]])
            .build()
            .unwrap()
    }

    #[test]
    fn test_from_sensitivity_selects_block() {
        let s = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];

        let r = resistance_from_sensitivity(&s, &[0, 2], &[1, 2], false);
        assert_eq!(r, Resistance::PerSpecies(vec![-5.0, -17.0]));

        let r = resistance_from_sensitivity(&s, &[0, 2], &[1, 2], true);
        assert_eq!(r, Resistance::Aggregated(-22.0));
    }

    #[test]
    fn test_chain_resistance() {
        let web = chain();
        let r = resistance().model(&web).biomass(&[0.2, 0.8]).call().unwrap();
        let values = r.per_species().unwrap();

        assert_relative_eq!(values[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(values[1], -3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_aggregated_equals_sum() {
        let web = chain();
        let per_species = resistance().model(&web).biomass(&[0.2, 0.8]).call().unwrap();
        let aggregated = resistance()
            .model(&web)
            .biomass(&[0.2, 0.8])
            .aggregated(true)
            .call()
            .unwrap();

        assert_relative_eq!(aggregated.total(), per_species.total(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_selection() {
        let web = chain();
        let err = resistance()
            .model(&web)
            .biomass(&[0.2, 0.8])
            .response_of(5usize)
            .call()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_simulated_total_undefined() {
        let r = SimulatedResistance::PerSpecies(vec![
            SpeciesResponse::Defined(1.0),
            SpeciesResponse::Undefined,
        ]);
        assert_eq!(r.total(), None);

        let r = SimulatedResistance::PerSpecies(vec![
            SpeciesResponse::Defined(1.0),
            SpeciesResponse::Defined(2.5),
        ]);
        assert_eq!(r.total(), Some(3.5));
    }
}
