//! Population-Dynamics Models
//!
//! This module defines the [`EcologicalModel`] trait the analysis routines are written
//! against, together with [`FoodWeb`], a trophic network model that implements it.
//!
//! # Key Components
//!
//! - [`EcologicalModel`]: Growth-rate evaluation plus the mortality handle used for press perturbations
//! - [`FoodWeb`]: Producers with logistic growth, consumers feeding through a [`FunctionalResponse`]
//! - [`ModelError`]: Validation failures raised while assembling a [`FoodWeb`]
//!
//! # Dynamics
//!
//! For species `i` with biomass `B_i` the [`FoodWeb`] evaluates
//!
//! ```text
//! dB_i/dt = r_i B_i (1 - B_i / K_i)        (producers only)
//!         + e_i B_i Σ_j F_ij(B)             (consumption of resources j)
//!         - Σ_k B_k F_ki(B)                 (being eaten by consumers k)
//!         - d_i B_i                         (mortality)
//! ```
//!
//! where `F_ij` is the per-unit-biomass consumption of resource `j` by consumer `i`.

use bon::bon;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parameterized ecological dynamical system with a fixed number of species.
///
/// Implementors must be cheap to reason about as values: [`Clone`] is expected to be a
/// deep copy, so that a perturbed clone never aliases the parameters of the original.
pub trait EcologicalModel: Clone + Send + Sync {
    /// Number of species in the model.
    fn richness(&self) -> usize;

    /// Absolute growth rate `dB/dt` at the given biomass vector.
    fn growth_rate(&self, biomass: &[f64]) -> Vec<f64>;

    /// Per-capita growth rate `(1/B) dB/dt` at the given biomass vector.
    ///
    /// The default divides the absolute growth rate by the biomass and therefore yields
    /// `NaN` for extinct species. Models with a closed per-capita form should override it.
    fn per_capita_growth_rate(&self, biomass: &[f64]) -> Vec<f64> {
        self.growth_rate(biomass)
            .into_iter()
            .zip(biomass)
            .map(|(db, b)| if *b == 0.0 { f64::NAN } else { db / b })
            .collect()
    }

    /// Per-species mortality rates.
    fn mortality(&self) -> &[f64];

    /// Mutable access to the per-species mortality rates.
    fn mortality_mut(&mut self) -> &mut [f64];
}

/// Consumption term of a consumer on its resources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionalResponse {
    /// Lotka-Volterra type I response, `F_ij = a_ij B_j`.
    #[default]
    Linear,
    /// Holling type II/III response,
    /// `F_ij = a_ij B_j^q / (1 + h Σ_l a_il B_l^q)`.
    Classic { handling_time: f64, hill_exponent: f64 },
}

/// Errors raised while validating a [`FoodWeb`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Food web must contain at least one species")]
    Empty,
    #[error("Attack rate matrix must be square: row {row} has {found} entries, expected {expected}")]
    NonSquareAttackRates {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Parameter '{name}' has {found} entries, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("Parameter '{name}' has an invalid value {value} for species {species}")]
    InvalidValue {
        name: &'static str,
        species: usize,
        value: f64,
    },
    #[error("Invalid functional response: {0}")]
    InvalidFunctionalResponse(String),
}

/// A trophic network of producers and consumers.
///
/// Species without resources are producers and grow logistically; every other species
/// is a consumer whose growth is driven by consumption of its resources.
///
/// # Examples
///
/// ```
/// use ecostability::model::FoodWeb;
///
/// // Species 1 consumes species 0
/// let web = FoodWeb::builder()
///     .attack_rates(vec![vec![0.0, 0.0], vec![1.0, 0.0]])
///     .build()
///     .unwrap();
///
/// assert!(web.is_producer(0));
/// assert!(!web.is_producer(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFoodWeb")]
pub struct FoodWeb {
    /// `attack_rates[i][j] > 0` iff consumer `i` eats resource `j`
    attack_rates: Vec<Vec<f64>>,
    /// Intrinsic growth rates, only used for producers
    growth_rates: Vec<f64>,
    /// Carrying capacities, only used for producers
    carrying_capacities: Vec<f64>,
    /// Assimilation efficiencies, only used for consumers
    efficiencies: Vec<f64>,
    mortality: Vec<f64>,
    functional_response: FunctionalResponse,
}

#[bon]
impl FoodWeb {
    /// Creates a validated food web.
    ///
    /// Omitted parameters fall back to defaults: growth rate `1` for producers and `0`
    /// for consumers, carrying capacity `1`, efficiency `0.5`, mortality `0` for
    /// producers and `0.1` for consumers, and a [`FunctionalResponse::Linear`] response.
    ///
    /// # Arguments
    ///
    /// * `attack_rates` - Square matrix, `attack_rates[i][j]` is the rate at which `i` attacks `j`
    /// * `growth_rates` - Intrinsic growth rates
    /// * `carrying_capacities` - Producer carrying capacities
    /// * `efficiencies` - Consumer assimilation efficiencies
    /// * `mortality` - Per-species mortality rates
    /// * `functional_response` - Consumption term shared by all consumers
    ///
    /// # Returns
    ///
    /// Returns the food web or a [`ModelError`] describing the first invalid parameter.
    #[builder]
    pub fn new(
        attack_rates: Vec<Vec<f64>>,
        growth_rates: Option<Vec<f64>>,
        carrying_capacities: Option<Vec<f64>>,
        efficiencies: Option<Vec<f64>>,
        mortality: Option<Vec<f64>>,
        #[builder(default)] functional_response: FunctionalResponse,
    ) -> Result<Self, ModelError> {
        let n = attack_rates.len();
        if n == 0 {
            return Err(ModelError::Empty);
        }

        for (row, rates) in attack_rates.iter().enumerate() {
            if rates.len() != n {
                return Err(ModelError::NonSquareAttackRates {
                    row,
                    found: rates.len(),
                    expected: n,
                });
            }
        }

        let producers: Vec<bool> = attack_rates
            .iter()
            .map(|rates| rates.iter().all(|a| *a == 0.0))
            .collect();

        let growth_rates = growth_rates.unwrap_or_else(|| {
            producers
                .iter()
                .map(|p| if *p { 1.0 } else { 0.0 })
                .collect()
        });
        let mortality = mortality.unwrap_or_else(|| {
            producers
                .iter()
                .map(|p| if *p { 0.0 } else { 0.1 })
                .collect()
        });

        let web = Self {
            attack_rates,
            growth_rates,
            carrying_capacities: carrying_capacities.unwrap_or_else(|| vec![1.0; n]),
            efficiencies: efficiencies.unwrap_or_else(|| vec![0.5; n]),
            mortality,
            functional_response,
        };

        web.validate()?;
        Ok(web)
    }
}

/// Unvalidated serialized form of a [`FoodWeb`].
#[derive(Deserialize)]
struct RawFoodWeb {
    attack_rates: Vec<Vec<f64>>,
    growth_rates: Vec<f64>,
    carrying_capacities: Vec<f64>,
    efficiencies: Vec<f64>,
    mortality: Vec<f64>,
    #[serde(default)]
    functional_response: FunctionalResponse,
}

impl TryFrom<RawFoodWeb> for FoodWeb {
    type Error = ModelError;

    fn try_from(raw: RawFoodWeb) -> Result<Self, Self::Error> {
        let web = Self {
            attack_rates: raw.attack_rates,
            growth_rates: raw.growth_rates,
            carrying_capacities: raw.carrying_capacities,
            efficiencies: raw.efficiencies,
            mortality: raw.mortality,
            functional_response: raw.functional_response,
        };

        web.validate()?;
        Ok(web)
    }
}

impl FoodWeb {
    /// Checks lengths and value ranges of all parameters.
    ///
    /// Called on construction and deserialization.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.attack_rates.len();
        if n == 0 {
            return Err(ModelError::Empty);
        }

        for (row, rates) in self.attack_rates.iter().enumerate() {
            if rates.len() != n {
                return Err(ModelError::NonSquareAttackRates {
                    row,
                    found: rates.len(),
                    expected: n,
                });
            }
            if let Some(value) = rates.iter().find(|a| !a.is_finite() || **a < 0.0) {
                return Err(ModelError::InvalidValue {
                    name: "attack_rates",
                    species: row,
                    value: *value,
                });
            }
        }

        let vectors: [(&'static str, &[f64]); 4] = [
            ("growth_rates", &self.growth_rates),
            ("carrying_capacities", &self.carrying_capacities),
            ("efficiencies", &self.efficiencies),
            ("mortality", &self.mortality),
        ];

        for (name, values) in vectors {
            if values.len() != n {
                return Err(ModelError::LengthMismatch {
                    name,
                    found: values.len(),
                    expected: n,
                });
            }
            if let Some((species, value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(ModelError::InvalidValue {
                    name,
                    species,
                    value: *value,
                });
            }
        }

        for i in (0..n).filter(|i| self.is_producer(*i)) {
            if self.carrying_capacities[i] <= 0.0 {
                return Err(ModelError::InvalidValue {
                    name: "carrying_capacities",
                    species: i,
                    value: self.carrying_capacities[i],
                });
            }
        }

        if let FunctionalResponse::Classic {
            handling_time,
            hill_exponent,
        } = self.functional_response
        {
            if !handling_time.is_finite() || handling_time < 0.0 {
                return Err(ModelError::InvalidFunctionalResponse(format!(
                    "handling time must be non-negative, got {handling_time}"
                )));
            }
            if !hill_exponent.is_finite() || hill_exponent < 1.0 {
                return Err(ModelError::InvalidFunctionalResponse(format!(
                    "hill exponent must be at least 1, got {hill_exponent}"
                )));
            }
        }

        Ok(())
    }

    /// Returns true if species `i` has no resources.
    pub fn is_producer(&self, i: usize) -> bool {
        self.attack_rates[i].iter().all(|a| *a == 0.0)
    }

    /// Indices of the resources consumed by species `i`.
    pub fn resources_of(&self, i: usize) -> Vec<usize> {
        self.attack_rates[i]
            .iter()
            .enumerate()
            .filter(|(_, a)| **a > 0.0)
            .map(|(j, _)| j)
            .collect()
    }

    /// Indices of the consumers feeding on species `j`.
    pub fn consumers_of(&self, j: usize) -> Vec<usize> {
        (0..self.attack_rates.len())
            .filter(|k| self.attack_rates[*k][j] > 0.0)
            .collect()
    }

    pub fn attack_rates(&self) -> &[Vec<f64>] {
        &self.attack_rates
    }

    pub fn growth_rates(&self) -> &[f64] {
        &self.growth_rates
    }

    pub fn carrying_capacities(&self) -> &[f64] {
        &self.carrying_capacities
    }

    pub fn efficiencies(&self) -> &[f64] {
        &self.efficiencies
    }

    pub fn functional_response(&self) -> FunctionalResponse {
        self.functional_response
    }

    /// Consumption of every resource by every consumer, per unit consumer biomass.
    ///
    /// Returns the `F_ij` matrix together with the saturation denominator of each consumer.
    fn consumption(&self, biomass: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let n = self.attack_rates.len();

        match self.functional_response {
            FunctionalResponse::Linear => {
                let flows = self
                    .attack_rates
                    .iter()
                    .map(|rates| rates.iter().zip(biomass).map(|(a, b)| a * b).collect())
                    .collect();
                (flows, vec![1.0; n])
            }
            FunctionalResponse::Classic {
                handling_time,
                hill_exponent,
            } => {
                let powered: Vec<f64> = biomass
                    .iter()
                    .map(|b| hill_power(*b, hill_exponent))
                    .collect();

                let denominators: Vec<f64> = self
                    .attack_rates
                    .iter()
                    .map(|rates| {
                        1.0 + handling_time
                            * rates.iter().zip(&powered).map(|(a, p)| a * p).sum::<f64>()
                    })
                    .collect();

                let flows = self
                    .attack_rates
                    .iter()
                    .zip(&denominators)
                    .map(|(rates, denom)| {
                        rates
                            .iter()
                            .zip(&powered)
                            .map(|(a, p)| a * p / denom)
                            .collect()
                    })
                    .collect();

                (flows, denominators)
            }
        }
    }

    /// Logistic growth term per unit biomass for producers, zero for consumers.
    fn intrinsic_growth(&self, i: usize, b: f64) -> f64 {
        if self.is_producer(i) {
            self.growth_rates[i] * (1.0 - b / self.carrying_capacities[i])
        } else {
            0.0
        }
    }
}

/// `b^q` for the saturating response.
///
/// Integer exponents use the polynomial itself so the response stays differentiable at
/// `b = 0`; fractional exponents are only defined for non-negative `b`.
fn hill_power(b: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent <= i32::MAX as f64 {
        b.powi(exponent as i32)
    } else {
        b.max(0.0).powf(exponent)
    }
}

impl EcologicalModel for FoodWeb {
    fn richness(&self) -> usize {
        self.attack_rates.len()
    }

    fn growth_rate(&self, biomass: &[f64]) -> Vec<f64> {
        let n = self.richness();
        let (flows, _) = self.consumption(biomass);

        (0..n)
            .map(|i| {
                let b = biomass[i];
                let gain = self.efficiencies[i] * b * flows[i].iter().sum::<f64>();
                let loss: f64 = (0..n).map(|k| biomass[k] * flows[k][i]).sum();
                b * self.intrinsic_growth(i, b) + gain - loss - self.mortality[i] * b
            })
            .collect()
    }

    fn per_capita_growth_rate(&self, biomass: &[f64]) -> Vec<f64> {
        let n = self.richness();
        let (flows, denominators) = self.consumption(biomass);

        // Predation loss divided by B_i, written so that it stays finite at B_i = 0
        let predation_per_capita = |i: usize| -> f64 {
            match self.functional_response {
                FunctionalResponse::Linear => (0..n)
                    .map(|k| biomass[k] * self.attack_rates[k][i])
                    .sum(),
                FunctionalResponse::Classic { hill_exponent, .. } => {
                    let scale = hill_power(biomass[i], hill_exponent - 1.0);
                    (0..n)
                        .map(|k| biomass[k] * self.attack_rates[k][i] * scale / denominators[k])
                        .sum()
                }
            }
        };

        (0..n)
            .map(|i| {
                self.intrinsic_growth(i, biomass[i])
                    + self.efficiencies[i] * flows[i].iter().sum::<f64>()
                    - predation_per_capita(i)
                    - self.mortality[i]
            })
            .collect()
    }

    fn mortality(&self) -> &[f64] {
        &self.mortality
    }

    fn mortality_mut(&mut self) -> &mut [f64] {
        &mut self.mortality
    }
}
