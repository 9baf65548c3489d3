//! Parameter store
//!
//! Owns the authoritative current value of every registered adaptive
//! parameter together with its constraints, history, strategy, and
//! per-parameter strategy state. All mutation goes through the clamping
//! setter; external readers only ever receive copies.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::parameter::Parameter;
use crate::error::ParameterError;
use crate::history::BoundedHistory;
use crate::metrics::{EvolutionMetrics, GeneticOperationStats, OperatorStatistics};
use crate::strategy::context::StrategyContext;
use crate::strategy::traits::{AdjustmentStrategy, DynamicStrategy};

/// Retention and reproducibility configuration for a [`ParameterStore`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Retained metrics snapshots
    pub metrics_capacity: usize,
    /// Retained operation records
    pub operation_capacity: usize,
    /// Retained past values per parameter
    pub value_history_capacity: usize,
    /// RNG seed for exploratory strategy steps; random when absent
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            metrics_capacity: 200,
            operation_capacity: 500,
            value_history_capacity: 100,
            seed: None,
        }
    }
}

impl StoreConfig {
    /// Create a config with the default retention limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metrics history retention
    pub fn with_metrics_capacity(mut self, capacity: usize) -> Self {
        self.metrics_capacity = capacity;
        self
    }

    /// Set the operation history retention
    pub fn with_operation_capacity(mut self, capacity: usize) -> Self {
        self.operation_capacity = capacity;
        self
    }

    /// Set the per-parameter value history retention
    pub fn with_value_history_capacity(mut self, capacity: usize) -> Self {
        self.value_history_capacity = capacity;
        self
    }

    /// Fix the RNG seed for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Record of one applied parameter change
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    /// Parameter name
    pub name: String,
    /// Value before the change
    pub old_value: f64,
    /// Value after clamping and damping
    pub new_value: f64,
    /// Name of the strategy (or cause) that produced the change
    pub reason: String,
}

type ChangeListener = Box<dyn FnMut(&str, f64, f64) + Send>;

/// Owner of all registered adaptive parameters
pub struct ParameterStore {
    parameters: BTreeMap<String, Parameter>,
    metrics_history: BoundedHistory<EvolutionMetrics>,
    operation_history: BoundedHistory<GeneticOperationStats>,
    listeners: Vec<ChangeListener>,
    rng: StdRng,
    damping: f64,
    value_history_capacity: usize,
}

impl ParameterStore {
    /// Create a store with the default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with the given configuration
    pub fn with_config(config: StoreConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            parameters: BTreeMap::new(),
            metrics_history: BoundedHistory::new(config.metrics_capacity),
            operation_history: BoundedHistory::new(config.operation_capacity),
            listeners: Vec::new(),
            rng,
            damping: 1.0,
            value_history_capacity: config.value_history_capacity,
        }
    }

    /// Register a new adaptive parameter
    ///
    /// Fails when the bounds are inverted or empty, the default lies
    /// outside them, or the name is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        default_value: f64,
        min: f64,
        max: f64,
        strategy: impl Into<DynamicStrategy>,
    ) -> Result<(), ParameterError> {
        let name = name.into();
        if min >= max {
            return Err(ParameterError::InvalidConstraint { name, min, max });
        }
        if default_value < min || default_value > max {
            return Err(ParameterError::DefaultOutOfRange {
                name,
                default: default_value,
                min,
                max,
            });
        }
        if self.parameters.contains_key(&name) {
            return Err(ParameterError::DuplicateParameter(name));
        }

        let parameter = Parameter::new(
            name.clone(),
            default_value,
            min,
            max,
            strategy.into(),
            self.value_history_capacity,
        );
        self.parameters.insert(name, parameter);
        Ok(())
    }

    /// Current value of a parameter
    pub fn get(&self, name: &str) -> Result<f64, ParameterError> {
        self.parameters
            .get(name)
            .map(Parameter::value)
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))
    }

    /// Registered bounds of a parameter
    pub fn constraints(&self, name: &str) -> Result<(f64, f64), ParameterError> {
        self.parameters
            .get(name)
            .map(|p| (p.min(), p.max()))
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))
    }

    /// Retained past values of a parameter, oldest first
    pub fn parameter_history(&self, name: &str) -> Result<Vec<f64>, ParameterError> {
        self.parameters
            .get(name)
            .map(Parameter::history)
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))
    }

    /// Read-only view of a registered parameter
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Names of all registered parameters
    pub fn names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    /// Set a parameter, clamping the value into its bounds
    ///
    /// The clamped value is appended to the history even when it equals the
    /// previous value; listeners are notified only on an actual change.
    /// Returns `(old, new)` when the value changed.
    pub fn set(&mut self, name: &str, value: f64) -> Result<Option<(f64, f64)>, ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NonFiniteValue {
                name: name.to_string(),
                value,
            });
        }

        let parameter = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))?;

        let old = parameter.value;
        let clamped = parameter.clamp(value);
        parameter.value = clamped;
        parameter.history.push(clamped);

        if clamped != old {
            for listener in &mut self.listeners {
                listener(name, clamped, old);
            }
            Ok(Some((old, clamped)))
        } else {
            Ok(None)
        }
    }

    /// Restore a parameter to its registered default
    pub fn reset(&mut self, name: &str) -> Result<(), ParameterError> {
        let default = self
            .parameters
            .get(name)
            .map(Parameter::default_value)
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))?;
        self.set(name, default)?;
        Ok(())
    }

    /// Restore every parameter to its registered default
    pub fn reset_all(&mut self) {
        let names: Vec<String> = self.parameters.keys().cloned().collect();
        for name in names {
            // Names came from the map, so the lookup cannot fail
            let _ = self.reset(&name);
        }
    }

    /// Read-only copy of all current values
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.parameters
            .iter()
            .map(|(name, parameter)| (name.clone(), parameter.value()))
            .collect()
    }

    /// Subscribe to `(name, new_value, old_value)` change notifications
    pub fn on_parameter_change<F>(&mut self, listener: F)
    where
        F: FnMut(&str, f64, f64) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Scale factor in `(0, 1]` applied to every strategy-proposed delta
    pub fn set_damping(&mut self, damping: f64) {
        self.damping = damping.clamp(f64::MIN_POSITIVE, 1.0);
    }

    /// Retained metrics snapshots, oldest first
    pub fn metrics_history(&self) -> Vec<EvolutionMetrics> {
        self.metrics_history.to_vec()
    }

    /// Append an operation record for reward aggregation
    ///
    /// Does not trigger re-evaluation; that happens on the next
    /// [`ingest`](Self::ingest).
    pub fn ingest_operation_stats(&mut self, stats: GeneticOperationStats) {
        self.operation_history.push(stats);
    }

    /// Ingest a generation's metrics and re-evaluate every parameter
    ///
    /// Appends the metrics to the history, aggregates reward statistics
    /// from the operation history, evaluates each parameter's strategy, and
    /// applies the results through the clamping setter. A strategy that
    /// produces a non-finite value is logged and its parameter keeps the
    /// previous value. Returns the changes that were actually applied.
    pub fn ingest(&mut self, metrics: EvolutionMetrics) -> Vec<ParameterChange> {
        self.metrics_history.push(metrics);
        let operator_stats = OperatorStatistics::aggregate(self.operation_history.iter());

        let mut proposals: Vec<(String, f64, &'static str)> =
            Vec::with_capacity(self.parameters.len());
        {
            let ctx = StrategyContext {
                metrics: &metrics,
                metrics_history: &self.metrics_history,
                operation_history: &self.operation_history,
                operator_stats: &operator_stats,
            };
            let rng = &mut self.rng;
            for (name, parameter) in self.parameters.iter_mut() {
                let current = parameter.value;
                let Parameter {
                    strategy, state, ..
                } = parameter;
                let proposed = strategy.next_value(current, &ctx, state, &mut *rng);
                proposals.push((name.clone(), proposed, strategy.name()));
            }
        }

        let mut changes = Vec::new();
        for (name, proposed, reason) in proposals {
            if !proposed.is_finite() {
                log::warn!(
                    "strategy '{reason}' produced non-finite value for '{name}'; keeping previous"
                );
                continue;
            }

            let old = match self.get(&name) {
                Ok(value) => value,
                Err(_) => continue,
            };
            let damped = old + (proposed - old) * self.damping;
            if let Ok(Some((old_value, new_value))) = self.set(&name, damped) {
                changes.push(ParameterChange {
                    name,
                    old_value,
                    new_value,
                    reason: reason.to_string(),
                });
            }
        }
        changes
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
