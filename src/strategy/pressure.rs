//! Selection pressure heuristics
//!
//! Tournament size and elitism count are integer-valued knobs; both
//! strategies move in whole steps and rely on the store's bound clamping
//! for the hard limits.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::StrategyContext;
use super::traits::{AdjustmentStrategy, StrategyState};

/// Adaptive tournament size
///
/// Raises selection pressure while the search is still exploring
/// productively (low convergence, low stagnation) and lowers it when the
/// population converges or a plateau sets in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentSizeStrategy {
    /// Convergence below this counts as still exploring
    pub low_convergence: f64,
    /// Convergence above this counts as converged
    pub high_convergence: f64,
    /// Generations without improvement counted as a plateau
    pub stagnation_threshold: u64,
    /// Whole-number step applied per adjustment
    pub step: f64,
}

impl Default for TournamentSizeStrategy {
    fn default() -> Self {
        Self {
            low_convergence: 0.3,
            high_convergence: 0.7,
            stagnation_threshold: 8,
            step: 1.0,
        }
    }
}

impl TournamentSizeStrategy {
    /// Create a strategy with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the convergence band
    pub fn with_convergence_band(mut self, low: f64, high: f64) -> Self {
        self.low_convergence = low;
        self.high_convergence = high;
        self
    }

    /// Set the stagnation threshold
    pub fn with_stagnation_threshold(mut self, generations: u64) -> Self {
        self.stagnation_threshold = generations;
        self
    }
}

impl AdjustmentStrategy for TournamentSizeStrategy {
    fn name(&self) -> &'static str {
        "tournament_size"
    }

    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        _state: &mut StrategyState,
        _rng: &mut R,
    ) -> f64 {
        let convergence = ctx.convergence();
        let stagnation = ctx.stagnation();

        if convergence < self.low_convergence && stagnation < self.stagnation_threshold {
            (current + self.step).round()
        } else if convergence > self.high_convergence || stagnation >= self.stagnation_threshold {
            (current - self.step).round()
        } else {
            current.round()
        }
    }
}

/// Adaptive elitism count
///
/// Grows the elite, capped at a fraction of the population, while the
/// search converges with adequate diversity; shrinks it toward a floor of
/// one when diversity collapses or stagnation persists, so a locally
/// optimal elite cannot entrench itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElitismStrategy {
    /// Convergence above this allows the elite to grow
    pub high_convergence: f64,
    /// Diversity at or above this counts as adequate
    pub adequate_diversity: f64,
    /// Diversity below this shrinks the elite
    pub low_diversity: f64,
    /// Generations without improvement counted as persistent stagnation
    pub stagnation_threshold: u64,
    /// Elite size never exceeds this fraction of the population
    pub max_population_fraction: f64,
    /// Minimum elite size
    pub floor: f64,
}

impl Default for ElitismStrategy {
    fn default() -> Self {
        Self {
            high_convergence: 0.7,
            adequate_diversity: 0.4,
            low_diversity: 0.3,
            stagnation_threshold: 8,
            max_population_fraction: 0.1,
            floor: 1.0,
        }
    }
}

impl ElitismStrategy {
    /// Create a strategy with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fraction of the population the elite may occupy
    pub fn with_max_fraction(mut self, fraction: f64) -> Self {
        self.max_population_fraction = fraction;
        self
    }

    /// Set the stagnation threshold
    pub fn with_stagnation_threshold(mut self, generations: u64) -> Self {
        self.stagnation_threshold = generations;
        self
    }
}

impl AdjustmentStrategy for ElitismStrategy {
    fn name(&self) -> &'static str {
        "elitism_count"
    }

    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        _state: &mut StrategyState,
        _rng: &mut R,
    ) -> f64 {
        let diversity = ctx.diversity();
        let cap = (ctx.metrics.population_size as f64 * self.max_population_fraction)
            .floor()
            .max(self.floor);

        if diversity < self.low_diversity || ctx.stagnation() >= self.stagnation_threshold {
            (current - 1.0).round().max(self.floor)
        } else if ctx.convergence() > self.high_convergence && diversity >= self.adequate_diversity
        {
            (current + 1.0).round().min(cap)
        } else {
            current.round().clamp(self.floor, cap)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::BoundedHistory;
    use crate::metrics::EvolutionMetrics;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn eval<S: AdjustmentStrategy>(strategy: &S, current: f64, metrics: EvolutionMetrics) -> f64 {
        let mut metrics_history = BoundedHistory::new(50);
        metrics_history.push(metrics);
        let operation_history = BoundedHistory::new(50);
        let operator_stats = HashMap::new();
        let ctx = StrategyContext {
            metrics: &metrics,
            metrics_history: &metrics_history,
            operation_history: &operation_history,
            operator_stats: &operator_stats,
        };
        let mut state = StrategyState::new();
        let mut rng = StdRng::seed_from_u64(11);
        strategy.next_value(current, &ctx, &mut state, &mut rng)
    }

    #[test]
    fn test_tournament_grows_while_exploring() {
        let strategy = TournamentSizeStrategy::default();
        let metrics = EvolutionMetrics::new(3).with_convergence(0.2).with_stagnation(2);

        assert_relative_eq!(eval(&strategy, 3.0, metrics), 4.0);
    }

    #[test]
    fn test_tournament_shrinks_on_convergence() {
        let strategy = TournamentSizeStrategy::default();
        let metrics = EvolutionMetrics::new(3).with_convergence(0.8);

        assert_relative_eq!(eval(&strategy, 4.0, metrics), 3.0);
    }

    #[test]
    fn test_tournament_shrinks_on_plateau() {
        let strategy = TournamentSizeStrategy::default();
        let metrics = EvolutionMetrics::new(20).with_convergence(0.5).with_stagnation(12);

        assert_relative_eq!(eval(&strategy, 5.0, metrics), 4.0);
    }

    #[test]
    fn test_tournament_holds_in_neutral_band() {
        let strategy = TournamentSizeStrategy::default();
        let metrics = EvolutionMetrics::new(3).with_convergence(0.5).with_stagnation(2);

        assert_relative_eq!(eval(&strategy, 3.0, metrics), 3.0);
    }

    #[test]
    fn test_elitism_grows_when_converging_with_diversity() {
        let strategy = ElitismStrategy::default();
        let metrics = EvolutionMetrics::new(3)
            .with_convergence(0.8)
            .with_diversity(0.5)
            .with_population_size(100);

        assert_relative_eq!(eval(&strategy, 2.0, metrics), 3.0);
    }

    #[test]
    fn test_elitism_capped_by_population_fraction() {
        let strategy = ElitismStrategy::default();
        let metrics = EvolutionMetrics::new(3)
            .with_convergence(0.8)
            .with_diversity(0.5)
            .with_population_size(30);

        // 10% of 30 = 3
        assert_relative_eq!(eval(&strategy, 3.0, metrics), 3.0);
    }

    #[test]
    fn test_elitism_shrinks_toward_floor_on_low_diversity() {
        let strategy = ElitismStrategy::default();
        let metrics = EvolutionMetrics::new(3).with_diversity(0.1).with_population_size(100);

        assert_relative_eq!(eval(&strategy, 2.0, metrics), 1.0);
        assert_relative_eq!(eval(&strategy, 1.0, metrics), 1.0);
    }

    #[test]
    fn test_elitism_shrinks_on_persistent_stagnation() {
        let strategy = ElitismStrategy::default();
        let metrics = EvolutionMetrics::new(30)
            .with_diversity(0.5)
            .with_stagnation(10)
            .with_population_size(100);

        assert_relative_eq!(eval(&strategy, 4.0, metrics), 3.0);
    }
}
