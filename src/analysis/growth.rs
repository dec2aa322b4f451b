//! Growth-rate adapter
//!
//! Wraps a model's absolute and per-capita growth rates as pure functions of the biomass
//! vector, holding every other parameter fixed. The adapter borrows the model immutably,
//! so its parameters cannot change while any of the returned closures is alive, and the
//! closures can be evaluated from several threads at once.

use crate::model::EcologicalModel;

use super::error::AnalysisError;

/// Growth-rate functions of a model, ready for differentiation.
#[derive(Debug, Clone, Copy)]
pub struct GrowthRate<'a, M> {
    model: &'a M,
}

impl<'a, M: EcologicalModel> GrowthRate<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    pub fn richness(&self) -> usize {
        self.model.richness()
    }

    /// `B -> dB/dt`
    pub fn absolute(&self) -> impl Fn(&[f64]) -> Vec<f64> + Send + Sync + 'a {
        let model = self.model;
        move |biomass: &[f64]| model.growth_rate(biomass)
    }

    /// `B -> (1/B) dB/dt`
    pub fn per_capita(&self) -> impl Fn(&[f64]) -> Vec<f64> + Send + Sync + 'a {
        let model = self.model;
        move |biomass: &[f64]| model.per_capita_growth_rate(biomass)
    }
}

/// Checks that a biomass vector can be used as a linearization point for `model`.
pub(crate) fn check_biomass<M: EcologicalModel>(
    model: &M,
    biomass: &[f64],
) -> Result<(), AnalysisError> {
    if biomass.len() != model.richness() {
        return Err(AnalysisError::InvalidArgument(format!(
            "biomass vector has {} entries, expected {}",
            biomass.len(),
            model.richness()
        )));
    }

    if let Some((i, b)) = biomass
        .iter()
        .enumerate()
        .find(|(_, b)| !b.is_finite() || **b < 0.0)
    {
        return Err(AnalysisError::InvalidArgument(format!(
            "biomass of species {i} must be finite and non-negative, got {b}"
        )));
    }

    Ok(())
}
