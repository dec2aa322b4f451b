//! Keystoneness from the sensitivity matrix.

use ndarray::{Array1, Array2};

use crate::model::EcologicalModel;

use super::{error::AnalysisError, linalg::check_square, sensitivity::sensitivity_matrix};

/// Keystoneness of every species of `model` at `biomass`.
///
/// The keystoneness of species `i` is `Σ_{j≠i} |S[j, i]|`, the total equilibrium response of
/// the rest of the community to a press perturbation of `i`. A species decoupled from all
/// others has keystoneness zero.
///
/// # Arguments
///
/// * `model` - The ecological model
/// * `biomass` - Biomass vector, usually an equilibrium
///
/// # Returns
///
/// One value per species, or the error of [`sensitivity_matrix`].
pub fn keystoneness<M: EcologicalModel>(
    model: &M,
    biomass: &[f64],
) -> Result<Array1<f64>, AnalysisError> {
    let sensitivity = sensitivity_matrix(model, biomass)?;
    keystoneness_from_sensitivity(&sensitivity)
}

/// Keystoneness from a precomputed sensitivity matrix.
pub fn keystoneness_from_sensitivity(
    sensitivity: &Array2<f64>,
) -> Result<Array1<f64>, AnalysisError> {
    check_square(sensitivity, "sensitivity matrix")?;

    let keystoneness = sensitivity
        .columns()
        .into_iter()
        .enumerate()
        .map(|(i, column)| {
            column
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, s)| s.abs())
                .sum()
        })
        .collect();

    Ok(keystoneness)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;
    use crate::model::FoodWeb;

    #[test]
    fn test_column_sums_exclude_diagonal() {
        let s = array![[5.0, -2.0, 0.5], [1.0, 7.0, -0.5], [-3.0, 4.0, 9.0]];
        let k = keystoneness_from_sensitivity(&s).unwrap();
        assert_eq!(k, array![4.0, 6.0, 1.0]);
    }

    #[test]
    fn test_independent_species_are_not_keystone() {
        let web = FoodWeb::builder()
            .attack_rates(vec![vec![0.0, 0.0], vec![0.0, 0.0]])
            .build()
            .unwrap();

        let k = keystoneness(&web, &[1.0, 1.0]).unwrap();
        for value in k.iter() {
            assert_relative_eq!(*value, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_chain_keystoneness() {
        let web = FoodWeb::builder()
            .attack_rates(vec![vec![0.0, 0.0], vec![1.0, 0.0]])
            .build()
            .unwrap();

        // S = [[0, -2], [1, 2]]
        let k = keystoneness(&web, &[0.2, 0.8]).unwrap();
        assert_relative_eq!(k[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(k[1], 2.0, epsilon = 1e-6);
    }
}
