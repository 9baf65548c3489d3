//! Evolution metrics and operator statistics
//!
//! The data passed across the boundary with the surrounding evolutionary
//! engine: per-generation population metrics and per-batch operator outcome
//! records, plus the aggregated reward statistics derived from them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of genetic operator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorType {
    /// Parent selection
    Selection,
    /// Recombination of two parents
    Crossover,
    /// Random perturbation of a genome
    Mutation,
}

impl OperatorType {
    /// All operator categories in canonical order
    pub const ALL: [OperatorType; 3] = [Self::Selection, Self::Crossover, Self::Mutation];

    /// Lowercase name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Crossover => "crossover",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of population state, produced once per generation
/// by the external engine. The core never mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionMetrics {
    /// Generation number
    pub generation: u64,
    /// Best fitness in the population
    pub best_fitness: f64,
    /// Mean fitness across the population
    pub average_fitness: f64,
    /// Normalized population spread in [0, 1]
    pub diversity_score: f64,
    /// Normalized clustering around the best fitness in [0, 1]
    pub convergence_rate: f64,
    /// Consecutive generations without a best-fitness improvement
    pub generations_since_improvement: u64,
    /// Current population size
    pub population_size: usize,
}

impl EvolutionMetrics {
    /// Create a metrics snapshot for a generation
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            best_fitness: f64::NEG_INFINITY,
            average_fitness: 0.0,
            diversity_score: 0.0,
            convergence_rate: 0.0,
            generations_since_improvement: 0,
            population_size: 0,
        }
    }

    /// Set best fitness
    pub fn with_best_fitness(mut self, fitness: f64) -> Self {
        self.best_fitness = fitness;
        self
    }

    /// Set average fitness
    pub fn with_average_fitness(mut self, fitness: f64) -> Self {
        self.average_fitness = fitness;
        self
    }

    /// Set diversity score
    pub fn with_diversity(mut self, diversity: f64) -> Self {
        self.diversity_score = diversity;
        self
    }

    /// Set convergence rate
    pub fn with_convergence(mut self, convergence: f64) -> Self {
        self.convergence_rate = convergence;
        self
    }

    /// Set generations since improvement
    pub fn with_stagnation(mut self, generations: u64) -> Self {
        self.generations_since_improvement = generations;
        self
    }

    /// Set population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }
}

/// Outcome record for one batch of operator invocations, created by the
/// external engine after a generation completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticOperationStats {
    /// Category the operator belongs to
    pub operator_type: OperatorType,
    /// Name of the concrete variant that was applied
    pub operator_name: String,
    /// Number of applications in the batch
    pub apply_count: u64,
    /// Applications that produced an offspring at least as fit as its parents
    pub success_count: u64,
    /// Total fitness gain attributable to the batch
    pub fitness_improvement: f64,
}

impl GeneticOperationStats {
    /// Create a new operation stats record
    pub fn new(operator_type: OperatorType, operator_name: impl Into<String>) -> Self {
        Self {
            operator_type,
            operator_name: operator_name.into(),
            apply_count: 0,
            success_count: 0,
            fitness_improvement: 0.0,
        }
    }

    /// Set apply and success counts
    pub fn with_counts(mut self, applied: u64, succeeded: u64) -> Self {
        self.apply_count = applied;
        self.success_count = succeeded;
        self
    }

    /// Set total fitness improvement
    pub fn with_improvement(mut self, improvement: f64) -> Self {
        self.fitness_improvement = improvement;
        self
    }

    /// Fraction of applications that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.apply_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.apply_count as f64
        }
    }

    /// Fitness gain per application
    pub fn improvement_rate(&self) -> f64 {
        if self.apply_count == 0 {
            0.0
        } else {
            self.fitness_improvement / self.apply_count as f64
        }
    }
}

/// Aggregated reward statistics for one operator category
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorStatistics {
    /// Successes per application across the aggregated batches
    pub success_rate: f64,
    /// Fitness gain per application across the aggregated batches
    pub improvement_rate: f64,
}

impl OperatorStatistics {
    /// Aggregate a set of operation records into per-category statistics
    pub fn aggregate<'a, I>(records: I) -> HashMap<OperatorType, OperatorStatistics>
    where
        I: IntoIterator<Item = &'a GeneticOperationStats>,
    {
        let mut totals: HashMap<OperatorType, (u64, u64, f64)> = HashMap::new();
        for record in records {
            let entry = totals.entry(record.operator_type).or_insert((0, 0, 0.0));
            entry.0 += record.apply_count;
            entry.1 += record.success_count;
            entry.2 += record.fitness_improvement;
        }

        totals
            .into_iter()
            .map(|(op, (applied, succeeded, improvement))| {
                let stats = if applied == 0 {
                    OperatorStatistics::default()
                } else {
                    OperatorStatistics {
                        success_rate: succeeded as f64 / applied as f64,
                        improvement_rate: improvement / applied as f64,
                    }
                };
                (op, stats)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_operator_type_display() {
        assert_eq!(OperatorType::Selection.to_string(), "selection");
        assert_eq!(OperatorType::Crossover.to_string(), "crossover");
        assert_eq!(OperatorType::Mutation.to_string(), "mutation");
    }

    #[test]
    fn test_metrics_builder() {
        let metrics = EvolutionMetrics::new(7)
            .with_best_fitness(42.0)
            .with_average_fitness(30.0)
            .with_diversity(0.6)
            .with_convergence(0.3)
            .with_stagnation(2)
            .with_population_size(100);

        assert_eq!(metrics.generation, 7);
        assert_relative_eq!(metrics.best_fitness, 42.0);
        assert_relative_eq!(metrics.diversity_score, 0.6);
        assert_eq!(metrics.generations_since_improvement, 2);
        assert_eq!(metrics.population_size, 100);
    }

    #[test]
    fn test_operation_stats_rates() {
        let stats = GeneticOperationStats::new(OperatorType::Mutation, "gaussian")
            .with_counts(10, 4)
            .with_improvement(2.0);

        assert_relative_eq!(stats.success_rate(), 0.4);
        assert_relative_eq!(stats.improvement_rate(), 0.2);
    }

    #[test]
    fn test_operation_stats_empty_batch() {
        let stats = GeneticOperationStats::new(OperatorType::Crossover, "uniform");
        assert_relative_eq!(stats.success_rate(), 0.0);
        assert_relative_eq!(stats.improvement_rate(), 0.0);
    }

    #[test]
    fn test_aggregate_by_category() {
        let records = vec![
            GeneticOperationStats::new(OperatorType::Mutation, "gaussian")
                .with_counts(10, 5)
                .with_improvement(1.0),
            GeneticOperationStats::new(OperatorType::Mutation, "uniform")
                .with_counts(10, 3)
                .with_improvement(3.0),
            GeneticOperationStats::new(OperatorType::Crossover, "sbx")
                .with_counts(20, 10)
                .with_improvement(4.0),
        ];

        let aggregated = OperatorStatistics::aggregate(&records);

        let mutation = aggregated[&OperatorType::Mutation];
        assert_relative_eq!(mutation.success_rate, 0.4);
        assert_relative_eq!(mutation.improvement_rate, 0.2);

        let crossover = aggregated[&OperatorType::Crossover];
        assert_relative_eq!(crossover.success_rate, 0.5);
        assert_relative_eq!(crossover.improvement_rate, 0.2);

        assert!(!aggregated.contains_key(&OperatorType::Selection));
    }

    #[test]
    fn test_metrics_serde_roundtrip() {
        let metrics = EvolutionMetrics::new(3).with_best_fitness(1.5).with_diversity(0.4);
        let json = serde_json::to_string(&metrics).unwrap();
        let recovered: EvolutionMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(metrics, recovered);
    }
}
