//! Interaction and Sensitivity Engine
//!
//! # Key Components
//!
//! - [`interaction_matrix`]: Jacobian of the per-capita growth rate, `A[i, j]` is the effect
//!   of species `j` on the per-capita growth of species `i`
//! - [`sensitivity_matrix`]: `S = -A⁻¹`, the equilibrium biomass response of species `i` to
//!   a sustained unit increase of the mortality of species `j`
//! - [`sensitivity_from_interaction`]: The inversion step on its own, for callers that already
//!   hold an interaction matrix
//!
//! Both matrices are density dependent and are recomputed on every call.
//!
//! Before inverting, the reciprocal condition number `σ_min / σ_max` of `A` is estimated from
//! its singular values. Matrices whose reciprocal condition number falls below
//! [`SINGULARITY_TOLERANCE`] are reported as [`AnalysisError::SingularSystem`] instead of
//! yielding a matrix of huge or infinite entries.

use log::debug;
use ndarray::Array2;

use crate::model::EcologicalModel;

use super::{
    error::AnalysisError,
    growth::{check_biomass, GrowthRate},
    jacobian::{CentralDifference, Differentiator},
    linalg::{check_square, to_nalgebra, to_ndarray, DECOMPOSITION_EPS, MAX_ITERATIONS},
};

/// Reciprocal condition number below which the interaction matrix is treated as singular.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Per-capita interaction matrix of `model` at `biomass`.
///
/// # Arguments
///
/// * `model` - The ecological model
/// * `biomass` - Biomass vector, one non-negative entry per species
///
/// # Returns
///
/// The `n × n` interaction matrix.
pub fn interaction_matrix<M: EcologicalModel>(
    model: &M,
    biomass: &[f64],
) -> Result<Array2<f64>, AnalysisError> {
    interaction_matrix_with(model, biomass, &CentralDifference)
}

/// Same as [`interaction_matrix`] with a custom [`Differentiator`].
pub fn interaction_matrix_with<M: EcologicalModel, D: Differentiator + ?Sized>(
    model: &M,
    biomass: &[f64],
    differentiator: &D,
) -> Result<Array2<f64>, AnalysisError> {
    check_biomass(model, biomass)?;
    let growth = GrowthRate::new(model);
    differentiator.jacobian(&growth.per_capita(), biomass)
}

/// Sensitivity matrix `S = -A⁻¹` of `model` at `biomass`.
///
/// # Returns
///
/// The sensitivity matrix, [`AnalysisError::SingularSystem`] if the interaction matrix is
/// not invertible or [`AnalysisError::NumericalInstability`] if the decomposition fails.
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
/// let s = sensitivity_matrix(&web, &[0.2, 0.8]).unwrap();
///
/// // More consumer mortality releases the resource
/// assert!(s[[0, 1]] < 0.0);
/// assert!((s[[0, 1]] + 2.0).abs() < 1e-6);
/// ```
pub fn sensitivity_matrix<M: EcologicalModel>(
    model: &M,
    biomass: &[f64],
) -> Result<Array2<f64>, AnalysisError> {
    sensitivity_matrix_with(model, biomass, &CentralDifference)
}

/// Same as [`sensitivity_matrix`] with a custom [`Differentiator`].
pub fn sensitivity_matrix_with<M: EcologicalModel, D: Differentiator + ?Sized>(
    model: &M,
    biomass: &[f64],
    differentiator: &D,
) -> Result<Array2<f64>, AnalysisError> {
    let interaction = interaction_matrix_with(model, biomass, differentiator)?;
    sensitivity_from_interaction(&interaction)
}

/// Computes `-A⁻¹` for an interaction matrix `A`.
pub fn sensitivity_from_interaction(
    interaction: &Array2<f64>,
) -> Result<Array2<f64>, AnalysisError> {
    check_square(interaction, "interaction matrix")?;

    let a = to_nalgebra(interaction);
    let rcond = reciprocal_condition(&a)?;
    debug!("Interaction matrix reciprocal condition number: {rcond:e}");

    if rcond < SINGULARITY_TOLERANCE {
        return Err(AnalysisError::SingularSystem { rcond });
    }

    let inverse = a
        .try_inverse()
        .ok_or(AnalysisError::SingularSystem { rcond })?;

    let sensitivity = to_ndarray(&(-inverse));
    if sensitivity.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NumericalInstability(
            "inverse of the interaction matrix has non-finite entries".to_string(),
        ));
    }

    Ok(sensitivity)
}

/// Ratio of the smallest to the largest singular value, zero for the zero matrix.
fn reciprocal_condition(matrix: &nalgebra::DMatrix<f64>) -> Result<f64, AnalysisError> {
    let svd = matrix
        .clone()
        .try_svd(false, false, DECOMPOSITION_EPS, MAX_ITERATIONS)
        .ok_or_else(|| {
            AnalysisError::NumericalInstability(
                "singular value decomposition did not converge".to_string(),
            )
        })?;

    let max = svd.singular_values.max();
    let min = svd.singular_values.min();

    if max == 0.0 {
        Ok(0.0)
    } else {
        Ok(min / max)
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
    fn test_chain_interaction_matrix() {
        let a = interaction_matrix(&chain(), &[0.2, 0.8]).unwrap();
        let expected = array![[-1.0, -1.0], [0.5, 0.0]];

        for (value, expected) in a.iter().zip(expected.iter()) {
            assert_relative_eq!(*value, *expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_chain_sensitivity_matrix() {
        let s = sensitivity_matrix(&chain(), &[0.2, 0.8]).unwrap();
        let expected = array![[0.0, -2.0], [1.0, 2.0]];

        for (value, expected) in s.iter().zip(expected.iter()) {
            assert_relative_eq!(*value, *expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sensitivity_is_negative_inverse() {
        let a = array![[-2.0, 0.5], [0.3, -1.0]];
        let s = sensitivity_from_interaction(&a).unwrap();
        let product = to_ndarray(&(to_nalgebra(&a) * to_nalgebra(&s)));

        assert_relative_eq!(product[[0, 0]], -1.0, epsilon = 1e-12);
        assert_relative_eq!(product[[1, 1]], -1.0, epsilon = 1e-12);
        assert_relative_eq!(product[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(product[[1, 0]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_system() {
        let err = sensitivity_from_interaction(&array![[1.0, 2.0], [2.0, 4.0]]).unwrap_err();
        assert!(err.is_singular());

        let err = sensitivity_from_interaction(&array![[0.0]]).unwrap_err();
        assert!(matches!(err, AnalysisError::SingularSystem { rcond } if rcond == 0.0));
    }

    #[test]
    fn test_singular_model() {
        // A lone producer without self-regulation has no per-capita density dependence
        let web = FoodWeb::builder()
            .attack_rates(vec![vec![0.0]])
            .growth_rates(vec![0.0])
            .build()
            .unwrap();

        let err = sensitivity_matrix(&web, &[1.0]).unwrap_err();
        assert!(err.is_singular());
    }
}
