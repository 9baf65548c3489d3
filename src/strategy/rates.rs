//! Mutation and crossover rate heuristics
//!
//! Both strategies react first to population-level signals (diversity,
//! convergence, stagnation) and fall back to per-operator reward statistics
//! when the population signals are in their neutral band.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::StrategyContext;
use super::traits::{AdjustmentStrategy, StrategyState};
use crate::metrics::OperatorType;

/// Adaptive mutation rate
///
/// Increases the rate when diversity collapses or the search stagnates,
/// decays it when diversity is comfortably high, and otherwise refines it
/// from the mutation operator's observed success rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationRateStrategy {
    /// Diversity below this triggers a rate increase
    pub low_diversity: f64,
    /// Diversity above this (with low stagnation) triggers a decay
    pub high_diversity: f64,
    /// Generations without improvement counted as stagnation
    pub stagnation_threshold: u64,
    /// Multiplier applied when escalating
    pub growth_factor: f64,
    /// Multiplier applied when decaying
    pub decay_factor: f64,
    /// Mutation success rate below this triggers an exploratory increase
    pub low_success: f64,
    /// Mutation success rate above this triggers a gentle nudge upward
    pub high_success: f64,
    /// Multiplier for the exploratory increase
    pub probe_factor: f64,
    /// Multiplier for the gentle nudge
    pub nudge_factor: f64,
}

impl Default for MutationRateStrategy {
    fn default() -> Self {
        Self {
            low_diversity: 0.3,
            high_diversity: 0.7,
            stagnation_threshold: 10,
            growth_factor: 1.5,
            decay_factor: 0.9,
            low_success: 0.2,
            high_success: 0.6,
            probe_factor: 1.2,
            nudge_factor: 1.05,
        }
    }
}

impl MutationRateStrategy {
    /// Create a strategy with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diversity band
    pub fn with_diversity_band(mut self, low: f64, high: f64) -> Self {
        self.low_diversity = low;
        self.high_diversity = high;
        self
    }

    /// Set the stagnation threshold
    pub fn with_stagnation_threshold(mut self, generations: u64) -> Self {
        self.stagnation_threshold = generations;
        self
    }

    /// Set growth and decay multipliers
    pub fn with_factors(mut self, growth: f64, decay: f64) -> Self {
        self.growth_factor = growth;
        self.decay_factor = decay;
        self
    }
}

impl AdjustmentStrategy for MutationRateStrategy {
    fn name(&self) -> &'static str {
        "mutation_rate"
    }

    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        _state: &mut StrategyState,
        _rng: &mut R,
    ) -> f64 {
        let diversity = ctx.diversity();
        let stagnation = ctx.stagnation();

        if diversity < self.low_diversity || stagnation > self.stagnation_threshold {
            return current * self.growth_factor;
        }

        if diversity > self.high_diversity && stagnation <= self.stagnation_threshold / 2 {
            return current * self.decay_factor;
        }

        let stats = ctx.operator_statistics(OperatorType::Mutation);
        if stats.success_rate < self.low_success {
            current * self.probe_factor
        } else if stats.success_rate > self.high_success {
            current * self.nudge_factor
        } else {
            current
        }
    }
}

/// Adaptive crossover rate
///
/// Exploits good schemata when the population is converging with adequate
/// diversity, yields to mutation when diversity is low, and otherwise
/// shifts the rate toward whichever of crossover or mutation is currently
/// producing more improvement per application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossoverRateStrategy {
    /// Convergence above this counts as converging
    pub high_convergence: f64,
    /// Diversity at or above this counts as adequate
    pub adequate_diversity: f64,
    /// Diversity below this yields rate to mutation
    pub low_diversity: f64,
    /// Multiplier applied when exploiting schemata
    pub growth_factor: f64,
    /// Multiplier applied when yielding to mutation
    pub decay_factor: f64,
    /// Additive step when shifting toward the more productive operator
    pub shift_step: f64,
}

impl Default for CrossoverRateStrategy {
    fn default() -> Self {
        Self {
            high_convergence: 0.7,
            adequate_diversity: 0.4,
            low_diversity: 0.3,
            growth_factor: 1.1,
            decay_factor: 0.9,
            shift_step: 0.05,
        }
    }
}

impl CrossoverRateStrategy {
    /// Create a strategy with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the convergence threshold
    pub fn with_high_convergence(mut self, convergence: f64) -> Self {
        self.high_convergence = convergence;
        self
    }

    /// Set the diversity thresholds
    pub fn with_diversity_band(mut self, low: f64, adequate: f64) -> Self {
        self.low_diversity = low;
        self.adequate_diversity = adequate;
        self
    }

    /// Set the shift step
    pub fn with_shift_step(mut self, step: f64) -> Self {
        self.shift_step = step;
        self
    }
}

impl AdjustmentStrategy for CrossoverRateStrategy {
    fn name(&self) -> &'static str {
        "crossover_rate"
    }

    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        _state: &mut StrategyState,
        _rng: &mut R,
    ) -> f64 {
        let diversity = ctx.diversity();

        if ctx.convergence() > self.high_convergence && diversity >= self.adequate_diversity {
            return current * self.growth_factor;
        }

        if diversity < self.low_diversity {
            return current * self.decay_factor;
        }

        let crossover = ctx.operator_statistics(OperatorType::Crossover);
        let mutation = ctx.operator_statistics(OperatorType::Mutation);
        if crossover.improvement_rate > mutation.improvement_rate {
            current + self.shift_step
        } else if mutation.improvement_rate > crossover.improvement_rate {
            current - self.shift_step
        } else {
            current
        }
    }
}
