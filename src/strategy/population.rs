//! Population size heuristic
//!
//! Population size is the most disruptive knob the engine exposes, so it is
//! only re-evaluated on a fixed generation cadence to avoid oscillation.
//! The cadence bookkeeping lives in the per-parameter [`StrategyState`]
//! rather than inside the strategy.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::StrategyContext;
use super::traits::{AdjustmentStrategy, StrategyState};

/// Cadence-gated adaptive population size
///
/// Grows the population multiplicatively when diversity is critically low
/// or stagnation is high, and shrinks it when the search converges with
/// adequate diversity and no stagnation, trading exploration capacity for
/// throughput.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationSizeStrategy {
    /// Minimum generations between adjustments
    pub adjustment_interval: u64,
    /// Diversity below this is critical
    pub critical_diversity: f64,
    /// Generations without improvement counted as high stagnation
    pub stagnation_threshold: u64,
    /// Convergence above this allows shrinking
    pub high_convergence: f64,
    /// Diversity at or above this counts as adequate when shrinking
    pub adequate_diversity: f64,
    /// Multiplier applied when growing
    pub growth_factor: f64,
    /// Multiplier applied when shrinking
    pub decay_factor: f64,
}

impl Default for PopulationSizeStrategy {
    fn default() -> Self {
        Self {
            adjustment_interval: 10,
            critical_diversity: 0.2,
            stagnation_threshold: 12,
            high_convergence: 0.7,
            adequate_diversity: 0.4,
            growth_factor: 1.25,
            decay_factor: 0.9,
        }
    }
}

impl PopulationSizeStrategy {
    /// Create a strategy with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the adjustment cadence
    pub fn with_adjustment_interval(mut self, generations: u64) -> Self {
        self.adjustment_interval = generations;
        self
    }

    /// Set growth and decay multipliers
    pub fn with_factors(mut self, growth: f64, decay: f64) -> Self {
        self.growth_factor = growth;
        self.decay_factor = decay;
        self
    }
}

impl AdjustmentStrategy for PopulationSizeStrategy {
    fn name(&self) -> &'static str {
        "population_size"
    }

    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        state: &mut StrategyState,
        _rng: &mut R,
    ) -> f64 {
        let generation = ctx.metrics.generation;
        let last = state.last_adjustment_generation.unwrap_or(0);
        if generation.saturating_sub(last) < self.adjustment_interval {
            return current;
        }

        let diversity = ctx.diversity();
        let stagnation = ctx.stagnation();

        let next = if diversity < self.critical_diversity || stagnation >= self.stagnation_threshold
        {
            (current * self.growth_factor).round()
        } else if ctx.convergence() > self.high_convergence
            && diversity >= self.adequate_diversity
            && stagnation <= self.stagnation_threshold / 2
        {
            (current * self.decay_factor).round()
        } else {
            current
        };

        if next != current {
            state.last_adjustment_generation = Some(generation);
        }
        next
    }
}
