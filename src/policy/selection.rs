//! Adaptive operator selection
//!
//! A bandit-style policy over competing operator variants within each
//! category. Reward is the fitness improvement attributed to a variant;
//! selection is weighted-random with weights blending an exploitation share
//! (proportional to the variant's moving-average improvement rate) and a
//! fixed exploration floor, so no variant's selection probability ever
//! reaches zero and an early lucky variant cannot starve the rest forever.

use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::metrics::{GeneticOperationStats, OperatorType};

/// Configuration for the operator selection policy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Learning rate of the exponential moving averages
    pub learning_rate: f64,
    /// Total selection probability reserved for exploration
    pub exploration_floor: f64,
    /// Performance updates between weight renormalizations
    pub renormalize_every: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.3,
            exploration_floor: 0.1,
            renormalize_every: 4,
        }
    }
}

impl PolicyConfig {
    /// Create a config with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the moving-average learning rate
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Set the exploration floor
    pub fn with_exploration_floor(mut self, floor: f64) -> Self {
        self.exploration_floor = floor;
        self
    }

    /// Set the renormalization frequency
    pub fn with_renormalize_every(mut self, updates: u64) -> Self {
        self.renormalize_every = updates.max(1);
        self
    }
}

/// Running performance estimate for one operator variant
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorPerformance {
    /// Variant name
    pub name: String,
    /// Moving-average success rate
    pub success_rate: f64,
    /// Moving-average fitness improvement per application
    pub improvement_rate: f64,
    /// Current selection weight
    pub weight: f64,
    /// Number of performance updates applied
    pub updates: u64,
}

#[derive(Clone, Debug)]
struct CategoryArms {
    arms: Vec<OperatorPerformance>,
    updates_since_renormalize: u64,
}

impl CategoryArms {
    fn renormalize(&mut self, exploration_floor: f64) {
        let n = self.arms.len() as f64;
        let total: f64 = self.arms.iter().map(|a| a.improvement_rate.max(0.0)).sum();

        for arm in &mut self.arms {
            let exploit = if total > 0.0 {
                arm.improvement_rate.max(0.0) / total
            } else {
                1.0 / n
            };
            arm.weight = exploration_floor / n + (1.0 - exploration_floor) * exploit;
        }
        self.updates_since_renormalize = 0;
    }
}

/// Per-category bandit over named operator variants
#[derive(Clone, Debug)]
pub struct OperatorSelectionPolicy {
    config: PolicyConfig,
    categories: HashMap<OperatorType, CategoryArms>,
}

impl OperatorSelectionPolicy {
    /// Create a policy with the default configuration
    pub fn new() -> Self {
        Self::with_config(PolicyConfig::default())
    }

    /// Create a policy with the given configuration
    pub fn with_config(config: PolicyConfig) -> Self {
        Self {
            config,
            categories: HashMap::new(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Change the renormalization frequency at runtime
    pub fn set_renormalize_every(&mut self, updates: u64) {
        self.config.renormalize_every = updates.max(1);
    }

    /// Register the competing variants for a category
    ///
    /// Variants start with uniform weights. Registering the same name twice
    /// within one category is rejected.
    pub fn register_operators<I, S>(
        &mut self,
        category: OperatorType,
        names: I,
    ) -> Result<(), PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.categories.entry(category).or_insert(CategoryArms {
            arms: Vec::new(),
            updates_since_renormalize: 0,
        });

        for name in names {
            let name = name.into();
            if entry.arms.iter().any(|a| a.name == name) {
                return Err(PolicyError::DuplicateOperator { category, name });
            }
            entry.arms.push(OperatorPerformance {
                name,
                ..OperatorPerformance::default()
            });
        }

        let n = entry.arms.len() as f64;
        for arm in &mut entry.arms {
            arm.weight = 1.0 / n;
        }
        Ok(())
    }

    /// Choose a variant for a category by weighted-random sampling
    pub fn select_operator<R: Rng>(
        &self,
        category: OperatorType,
        rng: &mut R,
    ) -> Result<&str, PolicyError> {
        let arms = self
            .categories
            .get(&category)
            .filter(|c| !c.arms.is_empty())
            .ok_or(PolicyError::NoOperatorsRegistered(category))?;

        let weights: Vec<f64> = arms.arms.iter().map(|a| a.weight).collect();
        let index = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            // Degenerate weights collapse to the first variant
            Err(_) => 0,
        };
        Ok(&arms.arms[index].name)
    }

    /// Update a variant's reward estimates from an operation record
    ///
    /// For a single variant, records must arrive in generation order so the
    /// moving averages stay meaningful; unrelated variants may interleave
    /// freely. Weights are only renormalized every
    /// [`renormalize_every`](PolicyConfig::renormalize_every) updates.
    pub fn update_operator_performance(
        &mut self,
        stats: &GeneticOperationStats,
    ) -> Result<(), PolicyError> {
        let rate = self.config.learning_rate;
        let floor = self.config.exploration_floor;
        let every = self.config.renormalize_every;

        let arms = self
            .categories
            .get_mut(&stats.operator_type)
            .ok_or_else(|| PolicyError::UnknownOperator {
                category: stats.operator_type,
                name: stats.operator_name.clone(),
            })?;

        let arm = arms
            .arms
            .iter_mut()
            .find(|a| a.name == stats.operator_name)
            .ok_or_else(|| PolicyError::UnknownOperator {
                category: stats.operator_type,
                name: stats.operator_name.clone(),
            })?;

        if arm.updates == 0 {
            arm.success_rate = stats.success_rate();
            arm.improvement_rate = stats.improvement_rate();
        } else {
            arm.success_rate = (1.0 - rate) * arm.success_rate + rate * stats.success_rate();
            arm.improvement_rate =
                (1.0 - rate) * arm.improvement_rate + rate * stats.improvement_rate();
        }
        arm.updates += 1;

        arms.updates_since_renormalize += 1;
        if arms.updates_since_renormalize >= every {
            arms.renormalize(floor);
        }
        Ok(())
    }

    /// Current performance estimates for every registered variant
    pub fn operator_statistics(&self) -> HashMap<OperatorType, Vec<OperatorPerformance>> {
        self.categories
            .iter()
            .map(|(category, arms)| (*category, arms.arms.clone()))
            .collect()
    }
}

impl Default for OperatorSelectionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn policy_fixture() -> OperatorSelectionPolicy {
        let mut policy = OperatorSelectionPolicy::new();
        policy
            .register_operators(OperatorType::Mutation, ["gaussian", "uniform", "polynomial"])
            .unwrap();
        policy
    }

    fn mutation_stats(name: &str, applied: u64, succeeded: u64, improvement: f64) -> GeneticOperationStats {
        GeneticOperationStats::new(OperatorType::Mutation, name)
            .with_counts(applied, succeeded)
            .with_improvement(improvement)
    }

    #[test]
    fn test_initial_weights_uniform() {
        let policy = policy_fixture();
        let stats = policy.operator_statistics();
        for arm in &stats[&OperatorType::Mutation] {
            assert_relative_eq!(arm.weight, 1.0 / 3.0);
        }
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut policy = policy_fixture();
        let err = policy
            .register_operators(OperatorType::Mutation, ["gaussian"])
            .unwrap_err();
        assert!(matches!(err, PolicyError::DuplicateOperator { .. }));
    }

    #[test]
    fn test_select_without_registration() {
        let policy = OperatorSelectionPolicy::new();
        let mut rng = StdRng::seed_from_u64(5);
        let err = policy.select_operator(OperatorType::Selection, &mut rng).unwrap_err();
        assert!(matches!(err, PolicyError::NoOperatorsRegistered(_)));
    }

    #[test]
    fn test_update_unknown_variant_rejected() {
        let mut policy = policy_fixture();
        let err = policy
            .update_operator_performance(&mutation_stats("swap", 10, 5, 1.0))
            .unwrap_err();
        assert!(matches!(err, PolicyError::UnknownOperator { .. }));
    }

    #[test]
    fn test_rewarded_variant_gains_weight() {
        let mut policy = policy_fixture();

        // Four updates trigger a renormalization with the default config
        for _ in 0..4 {
            policy
                .update_operator_performance(&mutation_stats("gaussian", 10, 8, 5.0))
                .unwrap();
        }

        let stats = policy.operator_statistics();
        let arms = &stats[&OperatorType::Mutation];
        let gaussian = arms.iter().find(|a| a.name == "gaussian").unwrap();
        let uniform = arms.iter().find(|a| a.name == "uniform").unwrap();
        assert!(gaussian.weight > uniform.weight);
    }

    #[test]
    fn test_exploration_floor_never_reaches_zero() {
        let mut policy = policy_fixture();

        // Heavy reward concentrated on one variant for a long time
        for _ in 0..500 {
            policy
                .update_operator_performance(&mutation_stats("gaussian", 10, 10, 100.0))
                .unwrap();
            policy
                .update_operator_performance(&mutation_stats("uniform", 10, 0, 0.0))
                .unwrap();
        }

        let stats = policy.operator_statistics();
        for arm in &stats[&OperatorType::Mutation] {
            assert!(
                arm.weight >= 0.1 / 3.0 - 1e-12,
                "variant '{}' starved with weight {}",
                arm.name,
                arm.weight
            );
        }
    }

    #[test]
    fn test_renormalization_frequency() {
        let config = PolicyConfig::new().with_renormalize_every(3);
        let mut policy = OperatorSelectionPolicy::with_config(config);
        policy
            .register_operators(OperatorType::Crossover, ["sbx", "uniform"])
            .unwrap();

        let reward = GeneticOperationStats::new(OperatorType::Crossover, "sbx")
            .with_counts(10, 10)
            .with_improvement(10.0);

        policy.update_operator_performance(&reward).unwrap();
        policy.update_operator_performance(&reward).unwrap();

        // Weights unchanged until the third update
        let stats = policy.operator_statistics();
        assert_relative_eq!(stats[&OperatorType::Crossover][0].weight, 0.5);

        policy.update_operator_performance(&reward).unwrap();
        let stats = policy.operator_statistics();
        let sbx = stats[&OperatorType::Crossover]
            .iter()
            .find(|a| a.name == "sbx")
            .unwrap();
        assert!(sbx.weight > 0.5);
    }

    #[test]
    fn test_ema_blends_toward_recent_observations() {
        let mut policy = policy_fixture();

        policy
            .update_operator_performance(&mutation_stats("gaussian", 10, 10, 10.0))
            .unwrap();
        policy
            .update_operator_performance(&mutation_stats("gaussian", 10, 0, 0.0))
            .unwrap();

        let stats = policy.operator_statistics();
        let gaussian = stats[&OperatorType::Mutation]
            .iter()
            .find(|a| a.name == "gaussian")
            .unwrap();

        // First update seeds 1.0, second blends toward 0.0 with rate 0.3
        assert_relative_eq!(gaussian.success_rate, 0.7);
        assert_relative_eq!(gaussian.improvement_rate, 0.7);
        assert_eq!(gaussian.updates, 2);
    }

    #[test]
    fn test_selection_returns_registered_name() {
        let policy = policy_fixture();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..50 {
            let name = policy.select_operator(OperatorType::Mutation, &mut rng).unwrap();
            assert!(["gaussian", "uniform", "polynomial"].contains(&name));
        }
    }
}
