//! Linear-stability metrics of a Jacobian matrix.
//!
//! Both metrics accept any real square matrix, not only Jacobians produced by
//! [`jacobian_at`](super::jacobian::jacobian_at).
//!
//! - [`resilience`]: largest real part of the eigenvalues of `J`. Negative values mean the
//!   equilibrium is locally asymptotically stable.
//! - [`reactivity`]: largest eigenvalue of the symmetric part `(J + Jᵀ)/2`. Positive values
//!   mean a pulse disturbance can be transiently amplified even when the equilibrium is stable.

use nalgebra::{Schur, SymmetricEigen};
use ndarray::Array2;

use super::{
    error::AnalysisError,
    linalg::{check_square, to_nalgebra, DECOMPOSITION_EPS, MAX_ITERATIONS},
};

/// Maximum real part over the eigenvalues of `jacobian`.
///
/// # Arguments
///
/// * `jacobian` - Real square matrix
///
/// # Returns
///
/// The resilience, or [`AnalysisError::NumericalInstability`] if the Schur decomposition
/// does not converge.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use ecostability::analysis::metrics::resilience;
///
/// // Eigenvalues -1 ± 2i
/// let j = array![[-1.0, 2.0], [-2.0, -1.0]];
/// assert!((resilience(&j).unwrap() + 1.0).abs() < 1e-10);
/// ```
pub fn resilience(jacobian: &Array2<f64>) -> Result<f64, AnalysisError> {
    check_square(jacobian, "Jacobian")?;

    let schur = Schur::try_new(to_nalgebra(jacobian), DECOMPOSITION_EPS, MAX_ITERATIONS)
        .ok_or_else(|| {
            AnalysisError::NumericalInstability(
                "Schur decomposition did not converge".to_string(),
            )
        })?;

    let resilience = schur
        .complex_eigenvalues()
        .iter()
        .map(|lambda| lambda.re)
        .fold(f64::NEG_INFINITY, f64::max);

    finite(resilience, "resilience")
}

/// Largest eigenvalue of the symmetric part of `jacobian`.
pub fn reactivity(jacobian: &Array2<f64>) -> Result<f64, AnalysisError> {
    check_square(jacobian, "Jacobian")?;

    let j = to_nalgebra(jacobian);
    let symmetric = (&j + j.transpose()) * 0.5;

    let eigen = SymmetricEigen::try_new(symmetric, DECOMPOSITION_EPS, MAX_ITERATIONS)
        .ok_or_else(|| {
            AnalysisError::NumericalInstability(
                "symmetric eigendecomposition did not converge".to_string(),
            )
        })?;

    let reactivity = eigen
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    finite(reactivity, "reactivity")
}

fn finite(value: f64, name: &str) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NumericalInstability(format!(
            "{name} evaluated to {value}"
        )))
    }
}
