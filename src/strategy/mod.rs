//! Adjustment strategy library
//!
//! Reusable, composable tuning heuristics. Each strategy is a pure mapping
//! from `(current value, feedback context)` to the parameter's next value;
//! the parameter store owns any per-parameter mutable state and the bound
//! clamping of results.

pub mod context;
pub mod phased;
pub mod population;
pub mod pressure;
pub mod rates;
pub mod self_tuning;
pub mod traits;

pub mod prelude {
    pub use super::context::StrategyContext;
    pub use super::phased::TimePhasedStrategy;
    pub use super::population::PopulationSizeStrategy;
    pub use super::pressure::{ElitismStrategy, TournamentSizeStrategy};
    pub use super::rates::{CrossoverRateStrategy, MutationRateStrategy};
    pub use super::self_tuning::SelfTuningStrategy;
    pub use super::traits::{AdjustmentStrategy, DynamicStrategy, StrategyState};
}
