//! # evo-adapt
//!
//! Adaptive hyperparameter and operator control for evolutionary algorithms.
//!
//! This library closes the feedback loop between an evolution engine and its
//! own configuration: population metrics flow in each generation, tuning
//! strategies move the registered parameters inside their bounds, and a
//! bandit-style policy picks between competing operator variants based on the
//! fitness improvement they actually deliver.
//!
//! ## Core Concepts
//!
//! - **Bounded Parameters**: Every adaptive value carries hard constraints and a value history
//! - **Pluggable Strategies**: Pure tuning heuristics that read metrics and propose the next value
//! - **Operator Bandits**: Weighted-random selection between operator variants with a guaranteed exploration floor
//! - **Post-hoc Analysis**: Trends, correlations, and significance tests over the recorded adaptations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evo_adapt::prelude::*;
//!
//! let mut controller = AdaptiveController::with_config(ControllerConfig::new().with_seed(42));
//! controller.configure_defaults()?;
//! controller.register_operators(OperatorType::Mutation, ["gaussian", "uniform"])?;
//!
//! for generation in 0..500 {
//!     let metrics = EvolutionMetrics::new(generation)
//!         .with_best_fitness(best)
//!         .with_diversity(diversity);
//!     controller.begin_generation(metrics);
//!
//!     let mutation_rate = controller.parameter(names::MUTATION_RATE)?;
//!     let operator = controller.select_operator(OperatorType::Mutation)?;
//!     // ... run the generation with the adapted configuration ...
//! }
//! ```

pub mod analysis;
pub mod controller;
pub mod error;
pub mod history;
pub mod metrics;
pub mod parameter;
pub mod policy;
pub mod strategy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        AdaptationAnalyzer, AdaptationSummary, MetricKind, ParameterCorrelation, ParameterTrend,
        SignificantAdaptation, TrendDirection,
    };
    pub use crate::controller::{
        AdaptationLevel, AdaptiveControls, AdaptiveController, ControllerConfig,
        ParameterAdaptationEvent, ParameterSnapshot,
    };
    pub use crate::error::*;
    pub use crate::history::BoundedHistory;
    pub use crate::metrics::{
        EvolutionMetrics, GeneticOperationStats, OperatorStatistics, OperatorType,
    };
    pub use crate::parameter::prelude::*;
    pub use crate::policy::{OperatorPerformance, OperatorSelectionPolicy, PolicyConfig};
    pub use crate::strategy::prelude::*;
}
