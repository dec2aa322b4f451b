//! ODE-based implementation of the [`Simulator`] trait.

use log::debug;
use peroxide::fuga::{BasicODESolver, ODEIntegrator, ODESolver, RK4};

use crate::model::EcologicalModel;

use super::{
    error::SimulationError,
    problem::ModelProblem,
    setup::SimulationSetup,
    simulator::{validate_initial, Simulator},
    trajectory::Trajectory,
};

/// ODE-based simulator backed by a peroxide integrator.
///
/// # Examples
///
/// ```
/// use ecostability::prelude::*;
///
/// let web = FoodWeb::builder()
///     .attack_rates(vec![vec![0.0]])
///     .build()
///     .unwrap();
///
/// let simulator = OdeSimulator::default();
/// let trajectory = simulator.simulate(&web, &[0.1], 100.0).unwrap();
///
/// assert!((trajectory.final_state()[0] - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct OdeSimulator<S: ODEIntegrator + Copy = RK4> {
    setup: SimulationSetup,
    solver: S,
}

impl Default for OdeSimulator<RK4> {
    fn default() -> Self {
        Self {
            setup: SimulationSetup::default(),
            solver: RK4,
        }
    }
}

impl OdeSimulator<RK4> {
    /// Creates a simulator using the classic fourth-order Runge-Kutta scheme.
    pub fn new(setup: SimulationSetup) -> Result<Self, SimulationError> {
        Self::with_solver(setup, RK4)
    }
}

impl<S: ODEIntegrator + Copy> OdeSimulator<S> {
    /// Creates a simulator with a custom integrator.
    ///
    /// # Arguments
    ///
    /// * `setup` - Time span, step size and extinction threshold
    /// * `solver` - Any peroxide integrator, e.g. `RK4`, `RK5` or an adaptive scheme
    pub fn with_solver(setup: SimulationSetup, solver: S) -> Result<Self, SimulationError> {
        setup.validate()?;
        Ok(Self { setup, solver })
    }

    pub fn setup(&self) -> &SimulationSetup {
        &self.setup
    }

    /// Simulates until the end time configured in the setup.
    pub fn simulate_default<M: EcologicalModel>(
        &self,
        model: &M,
        initial: &[f64],
    ) -> Result<Trajectory, SimulationError>
    where
        S: Sync,
    {
        self.simulate(model, initial, self.setup.t_end)
    }

    /// Clamps round-off negatives, applies the extinction threshold and rejects non-finite states.
    fn clean_states(
        &self,
        times: &[f64],
        mut states: Vec<Vec<f64>>,
    ) -> Result<Vec<Vec<f64>>, SimulationError> {
        let threshold = self.setup.extinction_threshold;

        for (time, state) in times.iter().zip(states.iter_mut()) {
            for (species, b) in state.iter_mut().enumerate() {
                if !b.is_finite() {
                    return Err(SimulationError::NonFiniteState {
                        species,
                        time: *time,
                    });
                }
                if *b < 0.0 || threshold.is_some_and(|t| *b < t) {
                    *b = 0.0;
                }
            }
        }

        Ok(states)
    }
}

impl<S: ODEIntegrator + Copy + Sync> Simulator for OdeSimulator<S> {
    fn simulate<M: EcologicalModel>(
        &self,
        model: &M,
        initial: &[f64],
        t_end: f64,
    ) -> Result<Trajectory, SimulationError> {
        validate_initial(model, initial)?;

        if !t_end.is_finite() || t_end <= self.setup.t0 {
            return Err(SimulationError::InvalidSetup(format!(
                "t_end ({t_end}) must be finite and greater than t0 ({})",
                self.setup.t0
            )));
        }

        debug!(
            "Integrating {} species from t = {} to t = {} (dt = {})",
            model.richness(),
            self.setup.t0,
            t_end,
            self.setup.dt
        );

        let problem = ModelProblem::new(model);
        let solver = BasicODESolver::new(self.solver);
        let (times, states) = solver
            .solve(&problem, (self.setup.t0, t_end), self.setup.dt, initial)
            .map_err(|e| SimulationError::IntegrationError(e.to_string()))?;

        let states = self.clean_states(&times, states)?;
        Trajectory::new(times, states)
    }
}
