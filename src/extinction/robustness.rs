//! Robustness to Cascading Extinctions
//!
//! Monte-Carlo estimate of how well a community withstands the sequential loss of species.
//!
//! # Key Components
//!
//! - [`robustness`]: Runs independent random extinction sequences in parallel and averages them
//! - [`RobustnessEstimate`]: Estimate together with the per-trial scores it was built from
//! - [`Robustness`]: The reciprocal of the mean number of secondary extinctions per removal,
//!   or [`Robustness::Unbounded`] if no removal ever triggers one
//!
//! # Trials
//!
//! The reference state is obtained by simulating the unperturbed model from unit biomass.
//! Every trial then draws a random permutation of all species and walks through it: a species
//! that is still alive is forced extinct, the community is re-simulated, biomass at or below the
//! threshold is floored to zero and the number of species that were alive before the removal
//! but are gone afterwards is recorded. Species that already died in an earlier step are
//! skipped. A trial ends once every species is extinct and its score is the mean of the
//! recorded counts.
//!
//! Each trial owns a generator seeded from the caller's generator before any trial starts, so
//! estimates are reproducible for a seeded generator regardless of thread scheduling.

use std::collections::BTreeSet;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::error::AnalysisError, model::EcologicalModel, simulation::simulator::Simulator,
};

use super::secondary::{
    cascade, check_horizon, check_threshold, floor_extinct, DEFAULT_EXTINCTION_THRESHOLD,
    DEFAULT_HORIZON,
};

/// Robustness of a community, the reciprocal of the mean secondary extinctions per removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Robustness {
    Finite(f64),
    /// No removal caused a secondary extinction.
    Unbounded,
}

impl Robustness {
    /// Converts a mean number of secondary extinctions into a robustness.
    pub fn from_mean(mean_secondary_extinctions: f64) -> Self {
        if mean_secondary_extinctions == 0.0 {
            Robustness::Unbounded
        } else {
            Robustness::Finite(1.0 / mean_secondary_extinctions)
        }
    }

    /// The robustness as a number, `f64::INFINITY` when unbounded.
    pub fn value(&self) -> f64 {
        match self {
            Robustness::Finite(value) => *value,
            Robustness::Unbounded => f64::INFINITY,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Robustness::Unbounded)
    }
}

/// Result of [`robustness`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustnessEstimate {
    pub robustness: Robustness,
    /// Mean of the trial scores
    pub mean_secondary_extinctions: f64,
    /// Mean secondary extinctions per removal of every successful trial, in trial order
    pub trial_scores: Vec<f64>,
    /// Indices of the trials that failed and were skipped
    pub failed_trials: Vec<usize>,
    /// Equilibrium every trial starts from
    pub reference_state: Vec<f64>,
}

/// Estimates the robustness of `model` to random sequences of species loss.
///
/// # Arguments
///
/// * `model` - The ecological model
/// * `simulator` - Simulator used for the reference state and every re-equilibration
/// * `rng` - Random generator the per-trial seeds are drawn from
/// * `n_rep` - Number of independent trials, `100` by default
/// * `t_end` - Horizon of every simulation, `1000` by default
/// * `threshold` - Extinction threshold, `1e-6` by default
/// * `skip_failed_trials` - Drop failing trials instead of failing the estimate
/// * `show_progress` - Display a progress bar
///
/// # Returns
///
/// The [`RobustnessEstimate`]. Invalid arguments, or a reference state in which no species
/// survives, fail with [`AnalysisError::InvalidArgument`] before any trial starts. A failing
/// trial fails the whole estimate with [`AnalysisError::TrialFailed`] naming the first failing
/// trial and step, unless `skip_failed_trials` is set.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use ecostability::prelude::*;
///
/// // Two producers without any interaction
/// let web = FoodWeb::builder()
///     .attack_rates(vec![vec![0.0, 0.0], vec![0.0, 0.0]])
///     .build()
///     .unwrap();
///
/// let estimate = robustness()
///     .model(&web)
///     .simulator(&OdeSimulator::default())
///     .rng(&mut StdRng::seed_from_u64(42))
///     .n_rep(5)
///     .t_end(50.0)
///     .call()
///     .unwrap();
///
/// assert!(estimate.robustness.is_unbounded());
/// ```
#[bon::builder]
pub fn robustness<M, S, R>(
    model: &M,
    simulator: &S,
    rng: &mut R,
    #[builder(default = 100)] n_rep: usize,
    #[builder(default = DEFAULT_HORIZON)] t_end: f64,
    #[builder(default = DEFAULT_EXTINCTION_THRESHOLD)] threshold: f64,
    #[builder(default)] skip_failed_trials: bool,
    #[builder(default)] show_progress: bool,
) -> Result<RobustnessEstimate, AnalysisError>
where
    M: EcologicalModel,
    S: Simulator,
    R: Rng,
{
    if n_rep == 0 {
        return Err(AnalysisError::InvalidArgument(
            "number of repetitions must be positive".to_string(),
        ));
    }
    check_horizon(t_end)?;
    check_threshold(threshold)?;

    let reference_state = reference_state(model, simulator, t_end, threshold)?;
    if reference_state.iter().all(|b| *b == 0.0) {
        return Err(AnalysisError::InvalidArgument(
            "no species survives in the reference state".to_string(),
        ));
    }
    info!(
        "Reference state has {} of {} species alive",
        reference_state.iter().filter(|b| **b > 0.0).count(),
        reference_state.len()
    );

    let seeds: Vec<u64> = (0..n_rep).map(|_| rng.gen::<u64>()).collect();
    let progress_bar = progress_bar(n_rep as u64, show_progress);

    let trial = Trial {
        model,
        simulator,
        reference_state: &reference_state,
        t_end,
        threshold,
    };

    let outcomes: Vec<Result<f64, AnalysisError>> = seeds
        .par_iter()
        .enumerate()
        .map(|(index, seed)| {
            let outcome = trial.run(index, *seed);
            progress_bar.inc(1);
            outcome
        })
        .collect();

    progress_bar.finish_and_clear();

    let mut trial_scores = Vec::with_capacity(n_rep);
    let mut failed_trials = Vec::new();

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(score) => trial_scores.push(score),
            Err(err) if skip_failed_trials => {
                warn!("Skipping failed trial: {err}");
                failed_trials.push(index);
            }
            Err(err) => return Err(err),
        }
    }

    if trial_scores.is_empty() {
        return Err(AnalysisError::NumericalInstability(format!(
            "all {n_rep} robustness trials failed"
        )));
    }

    let mean_secondary_extinctions = trial_scores.iter().sum::<f64>() / trial_scores.len() as f64;
    let robustness = Robustness::from_mean(mean_secondary_extinctions);

    info!(
        "Robustness over {} trials: {:?} (mean secondary extinctions {:.4})",
        trial_scores.len(),
        robustness,
        mean_secondary_extinctions
    );

    Ok(RobustnessEstimate {
        robustness,
        mean_secondary_extinctions,
        trial_scores,
        failed_trials,
        reference_state,
    })
}

/// Simulates the unperturbed model from unit biomass and floors extinct species to zero.
fn reference_state<M: EcologicalModel, S: Simulator>(
    model: &M,
    simulator: &S,
    t_end: f64,
    threshold: f64,
) -> Result<Vec<f64>, AnalysisError> {
    let initial = vec![1.0; model.richness()];
    let trajectory = simulator.simulate(model, &initial, t_end)?;
    Ok(floor_extinct(trajectory.final_state(), threshold))
}

/// Shared, read-only context of all trials.
struct Trial<'a, M, S> {
    model: &'a M,
    simulator: &'a S,
    reference_state: &'a [f64],
    t_end: f64,
    threshold: f64,
}

impl<M: EcologicalModel, S: Simulator> Trial<'_, M, S> {
    /// Runs one extinction sequence and returns its mean secondary extinctions per removal.
    fn run(&self, index: usize, seed: u64) -> Result<f64, AnalysisError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sequence: Vec<usize> = (0..self.reference_state.len()).collect();
        sequence.shuffle(&mut rng);

        let mut state = self.reference_state.to_vec();
        let mut counts = Vec::with_capacity(sequence.len());

        for (step, species) in sequence.into_iter().enumerate() {
            if state.iter().all(|b| *b == 0.0) {
                break;
            }
            if state[species] == 0.0 {
                continue;
            }

            let alive: BTreeSet<usize> = state
                .iter()
                .enumerate()
                .filter(|(i, b)| **b > 0.0 && *i != species)
                .map(|(i, _)| i)
                .collect();

            state = cascade(
                self.model,
                self.simulator,
                &state,
                &[species],
                self.t_end,
                self.threshold,
            )
            .map_err(|err| AnalysisError::TrialFailed {
                trial: index,
                step,
                source: Box::new(err),
            })?;

            let lost = alive.iter().filter(|i| state[**i] == 0.0).count();
            counts.push(lost as f64);
        }

        let score = if counts.is_empty() {
            0.0
        } else {
            counts.iter().sum::<f64>() / counts.len() as f64
        };

        debug!("Trial {index}: {} removals, score {score:.4}", counts.len());
        Ok(score)
    }
}

fn progress_bar(length: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let progress_bar = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(
            "Robustness: {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} | {elapsed}/{eta}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ");
    progress_bar.set_style(style);
    progress_bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mean() {
        assert_eq!(Robustness::from_mean(0.5), Robustness::Finite(2.0));
        assert!(Robustness::from_mean(0.0).is_unbounded());
        assert_eq!(Robustness::Unbounded.value(), f64::INFINITY);
    }
}
