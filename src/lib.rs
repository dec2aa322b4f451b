//! Ecological Network Stability Library
//!
//! This library analyses the stability of population-dynamics models of ecological networks:
//! - Linearizing growth rates around a biomass vector (Jacobian and interaction matrices)
//! - Local stability indicators (resilience, reactivity)
//! - Press-perturbation responses (sensitivity matrix, keystoneness, resistance)
//! - Cascading extinctions and Monte-Carlo robustness estimates
//! - Simulating models forward in time through ODE integration

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::analysis::error::*;
    pub use crate::analysis::growth::*;
    pub use crate::analysis::jacobian::*;
    pub use crate::analysis::keystone::*;
    pub use crate::analysis::metrics::*;
    pub use crate::analysis::report::*;
    pub use crate::analysis::resistance::*;
    pub use crate::analysis::selection::*;
    pub use crate::analysis::sensitivity::*;
    pub use crate::extinction::robustness::*;
    pub use crate::extinction::secondary::*;
    pub use crate::io::*;
    pub use crate::model::*;
    pub use crate::simulation::error::*;
    pub use crate::simulation::setup::*;
    pub use crate::simulation::simulator::*;
    pub use crate::simulation::trajectory::*;

    #[cfg(feature = "simulation")]
    pub use crate::simulation::ode::*;
}

/// Population-dynamics models and the trait the analyses are written against
pub mod model;

/// Forward simulation of population-dynamics models
pub mod simulation {
    pub use crate::simulation::setup::SimulationSetup;
    pub use crate::simulation::simulator::Simulator;
    pub use crate::simulation::trajectory::Trajectory;

    #[cfg(feature = "simulation")]
    pub use crate::simulation::ode::OdeSimulator;
    #[cfg(feature = "simulation")]
    pub use peroxide::fuga::{BS23, DP45, RK4, RK5, RKF45, TSIT45};

    /// Error types for simulation failures
    pub mod error;
    /// Simulation setup and configuration
    pub mod setup;
    /// The simulator interface
    pub mod simulator;
    /// Simulated biomass time series
    pub mod trajectory;

    /// ODE integration backed by peroxide
    #[cfg(feature = "simulation")]
    pub mod ode;
    /// ODE problem adapter over a model
    #[cfg(feature = "simulation")]
    pub(crate) mod problem;
}

/// Stability and press-perturbation analysis
pub mod analysis {
    pub use crate::analysis::error::AnalysisError;
    pub use crate::analysis::selection::SpeciesSelection;

    /// Error types for analysis failures
    pub mod error;
    /// Growth-rate functions of a model
    pub mod growth;
    /// Numerical differentiation
    pub mod jacobian;
    /// Keystoneness
    pub mod keystone;
    /// Resilience and reactivity
    pub mod metrics;
    /// Stability report
    pub mod report;
    /// Analytic and simulated resistance
    pub mod resistance;
    /// Species selectors
    pub mod selection;
    /// Interaction and sensitivity matrices
    pub mod sensitivity;

    pub(crate) mod linalg;
}

/// Secondary extinctions and robustness
pub mod extinction {
    pub mod robustness;
    pub mod secondary;
}

/// IO functionality
pub mod io;
