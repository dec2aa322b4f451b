#[cfg(test)]
mod test_io {
    use approx::assert_relative_eq;
    use ecostability::prelude::*;
    use pretty_assertions::assert_eq;

    const CHAIN_PATH: &str = "tests/data/two_species_chain.json";

    #[test]
    fn test_load_food_web() {
        // ACT
        let web = load_food_web(CHAIN_PATH).expect("Failed to load food web");

        // ASSERT
        assert_eq!(web.richness(), 2);
        assert_eq!(web.mortality(), &[0.0, 0.1]);
        assert_eq!(web.functional_response(), FunctionalResponse::Linear);
        assert!(web.is_producer(0));

        let sensitivity = sensitivity_matrix(&web, &[0.2, 0.8]).unwrap();
        assert_relative_eq!(sensitivity[[1, 1]], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_save_and_load_food_web() {
        // ARRANGE
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.json");
        let web = FoodWeb::builder()
            .attack_rates(vec![
                vec![0.0, 0.0, 0.0],
                vec![0.8, 0.0, 0.0],
                vec![0.0, 0.4, 0.0],
            ])
            .functional_response(FunctionalResponse::Classic {
                handling_time: 0.2,
                hill_exponent: 1.2,
            })
            .build()
            .unwrap();

        // ACT
        save_food_web(&path, &web).expect("Failed to save food web");
        let loaded = load_food_web(&path).expect("Failed to load food web");

        // ASSERT
        assert_eq!(loaded, web);
    }

    #[test]
    fn test_load_invalid_food_web() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        std::fs::write(
            &path,
            r#"{
                "attack_rates": [[0.0]],
                "growth_rates": [1.0],
                "carrying_capacities": [1.0],
                "efficiencies": [0.5],
                "mortality": [0.1, 0.2]
            }"#,
        )
        .unwrap();

        let err = load_food_web(&path).unwrap_err();
        assert!(matches!(err, IOError::JsonParseError(_)));
        assert!(err.to_string().contains("'mortality' has 2 entries, expected 1"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_food_web("tests/data/does_not_exist.json");
        assert!(matches!(result, Err(IOError::FileNotFound(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("malformed.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_food_web(&path),
            Err(IOError::JsonParseError(_))
        ));
    }

    #[test]
    fn test_save_report() {
        // ARRANGE
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let web = load_food_web(CHAIN_PATH).unwrap();
        let report = StabilityReport::compute(&web, &[0.2, 0.8]).unwrap();

        // ACT
        save_report(&path, &report).expect("Failed to save report");

        // ASSERT
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: StabilityReport = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, report);
    }
}
