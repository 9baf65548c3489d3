//! Parameter store
//!
//! Bounded, named numeric parameters with history, strategies, and change
//! notifications.

pub mod parameter;
pub mod store;

/// Well-known parameter names used by the controller's default wiring
pub mod names {
    /// Per-gene mutation probability
    pub const MUTATION_RATE: &str = "mutation_rate";
    /// Probability that crossover is applied to a selected pair
    pub const CROSSOVER_RATE: &str = "crossover_rate";
    /// Number of contestants per selection tournament
    pub const TOURNAMENT_SIZE: &str = "tournament_size";
    /// Individuals carried unchanged into the next generation
    pub const ELITISM_COUNT: &str = "elitism_count";
    /// Population size; changes require buffer reallocation by the engine
    pub const POPULATION_SIZE: &str = "population_size";
}

pub mod prelude {
    pub use super::names;
    pub use super::parameter::Parameter;
    pub use super::store::{ParameterChange, ParameterStore, StoreConfig};
}
