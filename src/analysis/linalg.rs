//! Conversions between the `ndarray` matrices of the public API and the `nalgebra`
//! matrices used by the decompositions.

use nalgebra::DMatrix;
use ndarray::Array2;

use super::error::AnalysisError;

/// Tolerance passed to the iterative decompositions.
pub(crate) const DECOMPOSITION_EPS: f64 = f64::EPSILON;

/// Iteration cap for Schur, symmetric eigen and SVD routines.
pub(crate) const MAX_ITERATIONS: usize = 10_000;

pub(crate) fn to_nalgebra(matrix: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = matrix.dim();
    DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]])
}

pub(crate) fn to_ndarray(matrix: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| matrix[(i, j)])
}

/// Fails unless `matrix` is a non-empty square matrix with finite entries.
pub(crate) fn check_square(matrix: &Array2<f64>, name: &str) -> Result<(), AnalysisError> {
    let (rows, cols) = matrix.dim();
    if rows == 0 || rows != cols {
        return Err(AnalysisError::InvalidArgument(format!(
            "{name} must be a non-empty square matrix, got {rows}x{cols}"
        )));
    }

    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::InvalidArgument(format!(
            "{name} contains non-finite entries"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_conversion_preserves_layout() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let converted = to_nalgebra(&m);
        assert_eq!(converted[(0, 2)], 3.0);
        assert_eq!(converted[(1, 0)], 4.0);
        assert_eq!(to_ndarray(&converted), m);
    }

    #[test]
    fn test_check_square() {
        assert!(check_square(&array![[1.0, 2.0]], "m").is_err());
        assert!(check_square(&Array2::zeros((0, 0)), "m").is_err());
        assert!(check_square(&array![[f64::NAN]], "m").is_err());
        assert!(check_square(&array![[1.0]], "m").is_ok());
    }
}
