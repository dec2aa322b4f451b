//! Jacobian Engine
//!
//! This module linearizes vector-valued growth functions around a biomass vector.
//!
//! # Key Components
//!
//! - [`Differentiator`]: The differentiation scheme, swappable so that tests and callers can
//!   trade accuracy for cost
//! - [`CentralDifference`]: Second-order accurate central differences (default)
//! - [`ForwardDifference`]: First-order forward differences, half the function evaluations
//! - [`jacobian`]: Jacobian of an arbitrary function at a point
//! - [`jacobian_at`]: Jacobian of a model's absolute growth rate `dB/dt`
//!
//! Differentiation is delegated to `finitediff`, which perturbs each coordinate of an
//! `ndarray::Array1` and evaluates a scalar function. Row `i` of the Jacobian is the
//! gradient of the `i`-th output, so entry `[i, j]` is `∂f_i/∂B_j`.

use finitediff::FiniteDiff;
use ndarray::{Array1, Array2};

use crate::model::EcologicalModel;

use super::{
    error::AnalysisError,
    growth::{check_biomass, GrowthRate},
};

/// A numerical differentiation scheme producing Jacobian matrices.
pub trait Differentiator: Send + Sync {
    /// Computes the Jacobian of `f` at `point`.
    ///
    /// # Arguments
    ///
    /// * `f` - Vector-valued function, must return the same number of outputs for every input
    /// * `point` - Point of linearization, left untouched
    ///
    /// # Returns
    ///
    /// An `m × n` matrix where `m` is the output and `n` the input dimension of `f`.
    fn jacobian(
        &self,
        f: &dyn Fn(&[f64]) -> Vec<f64>,
        point: &[f64],
    ) -> Result<Array2<f64>, AnalysisError>;
}

/// Central finite differences, `(f(x + h) - f(x - h)) / 2h`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentralDifference;

/// Forward finite differences, `(f(x + h) - f(x)) / h`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardDifference;

impl Differentiator for CentralDifference {
    fn jacobian(
        &self,
        f: &dyn Fn(&[f64]) -> Vec<f64>,
        point: &[f64],
    ) -> Result<Array2<f64>, AnalysisError> {
        rowwise_jacobian(f, point, |x, component| x.central_diff(component))
    }
}

impl Differentiator for ForwardDifference {
    fn jacobian(
        &self,
        f: &dyn Fn(&[f64]) -> Vec<f64>,
        point: &[f64],
    ) -> Result<Array2<f64>, AnalysisError> {
        rowwise_jacobian(f, point, |x, component| x.forward_diff(component))
    }
}

/// Assembles a Jacobian from the gradients of the individual output components.
fn rowwise_jacobian<G>(
    f: &dyn Fn(&[f64]) -> Vec<f64>,
    point: &[f64],
    gradient: G,
) -> Result<Array2<f64>, AnalysisError>
where
    G: Fn(&Array1<f64>, &dyn Fn(&Array1<f64>) -> f64) -> Array1<f64>,
{
    if point.is_empty() {
        return Err(AnalysisError::InvalidArgument(
            "cannot differentiate at an empty point".to_string(),
        ));
    }

    let n = point.len();
    let m = f(point).len();
    let x = Array1::from_vec(point.to_vec());
    let mut jacobian = Array2::zeros((m, n));

    for i in 0..m {
        let component = |y: &Array1<f64>| -> f64 {
            let values = match y.as_slice() {
                Some(slice) => f(slice),
                None => f(&y.to_vec()),
            };
            values.get(i).copied().unwrap_or(f64::NAN)
        };

        let row = gradient(&x, &component);
        jacobian.row_mut(i).assign(&row);
    }

    if let Some(((i, j), value)) = jacobian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(AnalysisError::NumericalInstability(format!(
            "Jacobian entry [{i}, {j}] is {value}"
        )));
    }

    Ok(jacobian)
}

/// Computes the Jacobian of `f` at `point` with central differences.
///
/// # Arguments
///
/// * `f` - Vector-valued function of the biomass vector
/// * `point` - Biomass vector at which to linearize
///
/// # Returns
///
/// The Jacobian matrix, or [`AnalysisError::NumericalInstability`] if any entry is not finite.
///
/// # Examples
///
/// ```
/// use ecostability::analysis::jacobian::jacobian;
///
/// let f = |x: &[f64]| vec![x[0] * x[1], x[0] + 2.0 * x[1]];
/// let j = jacobian(&f, &[2.0, 3.0]).unwrap();
///
/// assert!((j[[0, 0]] - 3.0).abs() < 1e-6);
/// assert!((j[[0, 1]] - 2.0).abs() < 1e-6);
/// assert!((j[[1, 1]] - 2.0).abs() < 1e-6);
/// ```
pub fn jacobian<F>(f: &F, point: &[f64]) -> Result<Array2<f64>, AnalysisError>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    CentralDifference.jacobian(f, point)
}

/// Jacobian of the model's absolute growth rate `dB/dt` at `biomass`.
pub fn jacobian_at<M: EcologicalModel>(
    model: &M,
    biomass: &[f64],
) -> Result<Array2<f64>, AnalysisError> {
    jacobian_at_with(model, biomass, &CentralDifference)
}

/// Same as [`jacobian_at`] with a custom [`Differentiator`].
pub fn jacobian_at_with<M: EcologicalModel, D: Differentiator + ?Sized>(
    model: &M,
    biomass: &[f64],
    differentiator: &D,
) -> Result<Array2<f64>, AnalysisError> {
    check_biomass(model, biomass)?;
    let growth = GrowthRate::new(model);
    differentiator.jacobian(&growth.absolute(), biomass)
}
