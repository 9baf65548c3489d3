//! A single bounded adaptive parameter

use serde::{Deserialize, Serialize};

use crate::history::BoundedHistory;
use crate::strategy::traits::{DynamicStrategy, StrategyState};

/// A named numeric parameter with bounds, a default, an adjustment
/// strategy, and a bounded value history
///
/// Owned exclusively by the [`ParameterStore`](super::store::ParameterStore);
/// the value is only ever mutated through the store's clamping setter, so
/// `min ≤ value ≤ max` holds at all times.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) value: f64,
    pub(crate) default_value: f64,
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) strategy: DynamicStrategy,
    pub(crate) history: BoundedHistory<f64>,
    pub(crate) state: StrategyState,
}

impl Parameter {
    pub(crate) fn new(
        name: String,
        default_value: f64,
        min: f64,
        max: f64,
        strategy: DynamicStrategy,
        history_capacity: usize,
    ) -> Self {
        let mut history = BoundedHistory::new(history_capacity);
        history.push(default_value);
        Self {
            name,
            value: default_value,
            default_value,
            min,
            max,
            strategy,
            history,
            state: StrategyState::new(),
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Registered default value
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Lower bound
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Name of the attached adjustment strategy
    pub fn strategy_name(&self) -> &'static str {
        use crate::strategy::traits::AdjustmentStrategy;
        self.strategy.name()
    }

    /// Retained past values, oldest first
    pub fn history(&self) -> Vec<f64> {
        self.history.to_vec()
    }

    /// Clamp a candidate value into the parameter's bounds
    pub(crate) fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}
