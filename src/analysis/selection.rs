//! Species selectors for restricting analyses to a subset of the community.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

/// Either every species of the model or an explicit set of 0-based species indices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesSelection {
    #[default]
    All,
    Indices(BTreeSet<usize>),
}

impl SpeciesSelection {
    pub fn indices(indices: impl IntoIterator<Item = usize>) -> Self {
        SpeciesSelection::Indices(indices.into_iter().collect())
    }

    /// Resolves the selection into sorted species indices.
    ///
    /// # Arguments
    ///
    /// * `richness` - Number of species in the model
    ///
    /// # Returns
    ///
    /// The selected indices in ascending order, or [`AnalysisError::InvalidArgument`] if
    /// the set is empty or contains an index outside `[0, richness)`.
    pub fn resolve(&self, richness: usize) -> Result<Vec<usize>, AnalysisError> {
        match self {
            SpeciesSelection::All => Ok((0..richness).collect()),
            SpeciesSelection::Indices(indices) => {
                if indices.is_empty() {
                    return Err(AnalysisError::InvalidArgument(
                        "species selection must not be empty".to_string(),
                    ));
                }

                let invalid = indices.iter().filter(|i| **i >= richness).collect_vec();
                if !invalid.is_empty() {
                    return Err(AnalysisError::InvalidArgument(format!(
                        "species indices [{}] are out of range for a model with {} species",
                        invalid.iter().join(", "),
                        richness
                    )));
                }

                Ok(indices.iter().copied().collect())
            }
        }
    }
}

impl From<usize> for SpeciesSelection {
    fn from(index: usize) -> Self {
        SpeciesSelection::Indices(BTreeSet::from([index]))
    }
}

impl From<Vec<usize>> for SpeciesSelection {
    fn from(indices: Vec<usize>) -> Self {
        SpeciesSelection::indices(indices)
    }
}

impl From<&[usize]> for SpeciesSelection {
    fn from(indices: &[usize]) -> Self {
        SpeciesSelection::indices(indices.iter().copied())
    }
}

impl<const N: usize> From<[usize; N]> for SpeciesSelection {
    fn from(indices: [usize; N]) -> Self {
        SpeciesSelection::indices(indices)
    }
}

impl From<BTreeSet<usize>> for SpeciesSelection {
    fn from(indices: BTreeSet<usize>) -> Self {
        SpeciesSelection::Indices(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_all() {
        assert_eq!(SpeciesSelection::All.resolve(3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_resolve_sorts_and_deduplicates() {
        let selection: SpeciesSelection = vec![2usize, 0, 2].into();
        assert_eq!(selection.resolve(3).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let selection: SpeciesSelection = [0usize, 3].into();
        let err = selection.resolve(3).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_resolve_empty() {
        let selection = SpeciesSelection::indices(Vec::new());
        assert!(selection.resolve(3).unwrap_err().is_invalid_argument());
    }
}
