//! Strategy evaluation context
//!
//! An ephemeral, borrowed view over the feedback signals available to an
//! adjustment strategy: the latest metrics snapshot, the retained metrics
//! and operation histories, and the per-category reward aggregates. Built
//! fresh by the parameter store for every ingest cycle and never persisted.

use std::collections::HashMap;

use crate::history::BoundedHistory;
use crate::metrics::{EvolutionMetrics, GeneticOperationStats, OperatorStatistics, OperatorType};

/// Feedback context passed to every strategy evaluation
#[derive(Clone, Copy, Debug)]
pub struct StrategyContext<'a> {
    /// Metrics for the generation being ingested
    pub metrics: &'a EvolutionMetrics,
    /// Retained metrics history, oldest first (includes `metrics`)
    pub metrics_history: &'a BoundedHistory<EvolutionMetrics>,
    /// Retained operation records, oldest first
    pub operation_history: &'a BoundedHistory<GeneticOperationStats>,
    /// Reward statistics aggregated per operator category
    pub operator_stats: &'a HashMap<OperatorType, OperatorStatistics>,
}

impl StrategyContext<'_> {
    /// Aggregated statistics for one operator category
    ///
    /// Returns zeroed statistics when no records for the category exist yet.
    pub fn operator_statistics(&self, operator: OperatorType) -> OperatorStatistics {
        self.operator_stats.get(&operator).copied().unwrap_or_default()
    }

    /// Shorthand for the latest diversity score
    pub fn diversity(&self) -> f64 {
        self.metrics.diversity_score
    }

    /// Shorthand for the latest convergence rate
    pub fn convergence(&self) -> f64 {
        self.metrics.convergence_rate
    }

    /// Shorthand for generations since the last best-fitness improvement
    pub fn stagnation(&self) -> u64 {
        self.metrics.generations_since_improvement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_operator_statistics_defaults_to_zero() {
        let metrics = EvolutionMetrics::new(0);
        let metrics_history = BoundedHistory::new(10);
        let operation_history = BoundedHistory::new(10);
        let operator_stats = HashMap::new();

        let ctx = StrategyContext {
            metrics: &metrics,
            metrics_history: &metrics_history,
            operation_history: &operation_history,
            operator_stats: &operator_stats,
        };

        let stats = ctx.operator_statistics(OperatorType::Mutation);
        assert_relative_eq!(stats.success_rate, 0.0);
        assert_relative_eq!(stats.improvement_rate, 0.0);
    }

    #[test]
    fn test_shorthand_accessors() {
        let metrics = EvolutionMetrics::new(4)
            .with_diversity(0.25)
            .with_convergence(0.75)
            .with_stagnation(6);
        let metrics_history = BoundedHistory::new(10);
        let operation_history = BoundedHistory::new(10);
        let operator_stats = HashMap::new();

        let ctx = StrategyContext {
            metrics: &metrics,
            metrics_history: &metrics_history,
            operation_history: &operation_history,
            operator_stats: &operator_stats,
        };

        assert_relative_eq!(ctx.diversity(), 0.25);
        assert_relative_eq!(ctx.convergence(), 0.75);
        assert_eq!(ctx.stagnation(), 6);
    }
}
