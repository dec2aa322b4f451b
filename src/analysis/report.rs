//! Stability Report
//!
//! Bundles every local-stability quantity of a model at one biomass vector into a single
//! serializable value, which can be written to JSON with [`save_report`](crate::io::save_report).

use log::{info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::model::EcologicalModel;

use super::{
    error::AnalysisError,
    jacobian::jacobian_at,
    keystone::keystoneness_from_sensitivity,
    metrics::{reactivity, resilience},
    sensitivity::{interaction_matrix, sensitivity_from_interaction},
};

/// Local stability summary of a model at a biomass vector.
///
/// Matrices are stored row by row. When the interaction matrix is singular, the sensitivity
/// matrix and keystoneness are `None` and the remaining fields are still filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub biomass: Vec<f64>,
    pub resilience: f64,
    pub reactivity: f64,
    pub jacobian: Vec<Vec<f64>>,
    pub interaction_matrix: Vec<Vec<f64>>,
    pub sensitivity_matrix: Option<Vec<Vec<f64>>>,
    pub keystoneness: Option<Vec<f64>>,
}

impl StabilityReport {
    /// Computes the report for `model` at `biomass`.
    ///
    /// # Arguments
    ///
    /// * `model` - The ecological model
    /// * `biomass` - Biomass vector, usually an equilibrium
    ///
    /// # Returns
    ///
    /// The report, or the first error other than a singular interaction matrix.
    pub fn compute<M: EcologicalModel>(model: &M, biomass: &[f64]) -> Result<Self, AnalysisError> {
        let jacobian = jacobian_at(model, biomass)?;
        let resilience = resilience(&jacobian)?;
        let reactivity = reactivity(&jacobian)?;
        let interaction = interaction_matrix(model, biomass)?;

        let (sensitivity, keystoneness) = match sensitivity_from_interaction(&interaction) {
            Ok(sensitivity) => {
                let keystoneness = keystoneness_from_sensitivity(&sensitivity)?;
                (Some(rows(&sensitivity)), Some(keystoneness.to_vec()))
            }
            Err(err) if err.is_singular() => {
                warn!("Skipping sensitivity analysis: {err}");
                (None, None)
            }
            Err(err) => return Err(err),
        };

        info!("Resilience: {resilience:.6}, reactivity: {reactivity:.6}");

        Ok(Self {
            biomass: biomass.to_vec(),
            resilience,
            reactivity,
            jacobian: rows(&jacobian),
            interaction_matrix: rows(&interaction),
            sensitivity_matrix: sensitivity,
            keystoneness,
        })
    }

    /// Returns true if the equilibrium is locally asymptotically stable.
    pub fn is_stable(&self) -> bool {
        self.resilience < 0.0
    }

    /// Returns true if a pulse disturbance can be transiently amplified.
    pub fn is_reactive(&self) -> bool {
        self.reactivity > 0.0
    }
}

fn rows(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}
