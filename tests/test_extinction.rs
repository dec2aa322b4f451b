#[cfg(test)]
mod test_extinction {
    use std::collections::BTreeSet;

    use ecostability::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Species 1 consumes species 0, equilibrium at [0.2, 0.8].
    fn chain() -> FoodWeb {
        FoodWeb::builder()
            .attack_rates(vec![vec![0.0, 0.0], vec![1.0, 0.0]])
            .build()
            .unwrap()
    }

    /// `n` producers without any interaction.
    fn disconnected(n: usize) -> FoodWeb {
        FoodWeb::builder()
            .attack_rates(vec![vec![0.0; n]; n])
            .build()
            .unwrap()
    }

    /// Fails whenever species 0 is removed while species 1 is still alive.
    struct FailingSimulator {
        inner: OdeSimulator,
    }

    impl Simulator for FailingSimulator {
        fn simulate<M: EcologicalModel>(
            &self,
            model: &M,
            initial: &[f64],
            t_end: f64,
        ) -> Result<Trajectory, SimulationError> {
            if initial[0] == 0.0 && initial[1] > 0.0 {
                return Err(SimulationError::IntegrationError(
                    "scripted failure".to_string(),
                ));
            }
            self.inner.simulate(model, initial, t_end)
        }
    }

    #[test]
    fn test_removing_resource_starves_consumer() {
        // ARRANGE
        init_logger();
        let web = chain();
        let simulator = OdeSimulator::default();

        // ACT
        let lost = secondary_extinctions()
            .model(&web)
            .simulator(&simulator)
            .extinct_species(0usize)
            .biomass(&[0.2, 0.8])
            .call()
            .unwrap();

        // ASSERT
        assert_eq!(lost, BTreeSet::from([1]));
    }

    #[test]
    fn test_removing_consumer_has_no_effect() {
        init_logger();
        let web = chain();
        let biomass = vec![0.2, 0.8];

        let lost = secondary_extinctions()
            .model(&web)
            .simulator(&OdeSimulator::default())
            .extinct_species(1usize)
            .biomass(&biomass)
            .call()
            .unwrap();

        assert!(lost.is_empty());
        assert_eq!(biomass, vec![0.2, 0.8]);
    }

    #[test]
    fn test_secondary_extinctions_invalid_arguments() {
        init_logger();
        let web = chain();
        let simulator = OdeSimulator::default();

        let err = secondary_extinctions()
            .model(&web)
            .simulator(&simulator)
            .extinct_species(2usize)
            .biomass(&[0.2, 0.8])
            .call()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = secondary_extinctions()
            .model(&web)
            .simulator(&simulator)
            .extinct_species(0usize)
            .biomass(&[0.2])
            .call()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = secondary_extinctions()
            .model(&web)
            .simulator(&simulator)
            .extinct_species(0usize)
            .biomass(&[0.2, 0.8])
            .t_end(-1.0)
            .call()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_chain_robustness() {
        // ARRANGE
        init_logger();
        let web = chain();
        let simulator = OdeSimulator::default();
        let mut rng = StdRng::seed_from_u64(7);

        // ACT
        let estimate = robustness()
            .model(&web)
            .simulator(&simulator)
            .rng(&mut rng)
            .n_rep(200)
            .call()
            .unwrap();

        // ASSERT
        // Removing the resource first costs one secondary extinction, removing the
        // consumer first costs none
        assert_eq!(estimate.trial_scores.len(), 200);
        assert!(estimate
            .trial_scores
            .iter()
            .all(|score| *score == 0.0 || *score == 1.0));
        assert!(estimate.failed_trials.is_empty());

        let mean = estimate.trial_scores.iter().sum::<f64>() / 200.0;
        assert_eq!(estimate.mean_secondary_extinctions, mean);
        assert_eq!(estimate.robustness, Robustness::Finite(1.0 / mean));

        let value = estimate.robustness.value();
        assert!((1.5..3.0).contains(&value), "robustness {value}");

        assert!((estimate.reference_state[0] - 0.2).abs() < 1e-6);
        assert!((estimate.reference_state[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_robustness_is_reproducible() {
        init_logger();
        let web = chain();
        let simulator = OdeSimulator::default();

        let run = |seed: u64| {
            robustness()
                .model(&web)
                .simulator(&simulator)
                .rng(&mut StdRng::seed_from_u64(seed))
                .n_rep(20)
                .t_end(500.0)
                .call()
                .unwrap()
        };

        assert_eq!(run(11).trial_scores, run(11).trial_scores);
    }

    #[test]
    fn test_disconnected_community_is_unbounded() {
        init_logger();
        let web = disconnected(3);

        let estimate = robustness()
            .model(&web)
            .simulator(&OdeSimulator::default())
            .rng(&mut StdRng::seed_from_u64(3))
            .n_rep(10)
            .t_end(100.0)
            .call()
            .unwrap();

        assert!(estimate.robustness.is_unbounded());
        assert_eq!(estimate.robustness.value(), f64::INFINITY);
        assert_eq!(estimate.mean_secondary_extinctions, 0.0);
    }

    #[test]
    fn test_robustness_invalid_arguments() {
        init_logger();
        let simulator = OdeSimulator::default();

        let err = robustness()
            .model(&chain())
            .simulator(&simulator)
            .rng(&mut StdRng::seed_from_u64(0))
            .n_rep(0)
            .call()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        // A producer that cannot grow dies out before any removal
        let doomed = FoodWeb::builder()
            .attack_rates(vec![vec![0.0]])
            .growth_rates(vec![0.0])
            .mortality(vec![0.1])
            .build()
            .unwrap();

        let err = robustness()
            .model(&doomed)
            .simulator(&simulator)
            .rng(&mut StdRng::seed_from_u64(0))
            .call()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_failing_trial_aborts_estimate() {
        init_logger();
        let simulator = FailingSimulator {
            inner: OdeSimulator::default(),
        };

        let err = robustness()
            .model(&chain())
            .simulator(&simulator)
            .rng(&mut StdRng::seed_from_u64(5))
            .n_rep(20)
            .call()
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::TrialFailed {
                step: 0,
                ref source,
                ..
            } if matches!(**source, AnalysisError::Simulation(_))
        ));
    }

    #[test]
    fn test_failing_trials_can_be_skipped() {
        init_logger();
        let simulator = FailingSimulator {
            inner: OdeSimulator::default(),
        };

        let estimate = robustness()
            .model(&chain())
            .simulator(&simulator)
            .rng(&mut StdRng::seed_from_u64(5))
            .n_rep(20)
            .skip_failed_trials(true)
            .call()
            .unwrap();

        // Only the trials removing the consumer first survive, and they cost nothing
        assert!(!estimate.failed_trials.is_empty());
        assert_eq!(
            estimate.trial_scores.len() + estimate.failed_trials.len(),
            20
        );
        assert!(estimate.robustness.is_unbounded());
    }
}
