//! Adapter exposing an [`EcologicalModel`] as a peroxide ODE problem.

use peroxide::fuga::ODEProblem;

use crate::model::EcologicalModel;

/// Right-hand side `dB/dt = growth_rate(B)` of a model, borrowed for one integration.
pub(crate) struct ModelProblem<'a, M> {
    model: &'a M,
}

impl<'a, M: EcologicalModel> ModelProblem<'a, M> {
    pub(crate) fn new(model: &'a M) -> Self {
        Self { model }
    }
}

impl<M: EcologicalModel> ODEProblem for ModelProblem<'_, M> {
    fn rhs(&self, _t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
        let rates = self.model.growth_rate(y);
        if rates.len() != dy.len() {
            anyhow::bail!(
                "growth rate returned {} entries for a state of {} species",
                rates.len(),
                dy.len()
            );
        }

        dy.copy_from_slice(&rates);
        Ok(())
    }
}
