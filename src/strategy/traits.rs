//! Adjustment strategy trait and enum dispatch
//!
//! A strategy maps `(current value, feedback context)` to the parameter's
//! next value. Strategies are stateless values; the mutable bookkeeping some
//! of them need (adjustment cadence, probe windows, step momentum) lives in
//! an explicit [`StrategyState`] owned by the parameter store per parameter
//! and passed into each call, which keeps evaluation deterministic given
//! identical inputs.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::StrategyContext;
use super::phased::TimePhasedStrategy;
use super::population::PopulationSizeStrategy;
use super::pressure::{ElitismStrategy, TournamentSizeStrategy};
use super::rates::{CrossoverRateStrategy, MutationRateStrategy};
use super::self_tuning::SelfTuningStrategy;

/// Per-parameter mutable bookkeeping for stateful strategies
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StrategyState {
    /// Generation at which the strategy last changed the value
    pub last_adjustment_generation: Option<u64>,
    /// Rolling `(value, resulting best fitness)` observations
    pub probe_window: VecDeque<(f64, f64)>,
    /// Current hill-climbing step size
    pub step_size: Option<f64>,
    /// Sign of the last move: -1.0, 0.0, or 1.0
    pub last_direction: f64,
}

impl StrategyState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }
}

/// Adjustment strategy trait
///
/// Implementations must be pure: no global state, no mutation of the
/// context, and identical output for identical
/// `(current, ctx, state, rng state)` inputs.
pub trait AdjustmentStrategy: Send + Sync {
    /// Stable name used to address the strategy in events and reports
    fn name(&self) -> &'static str;

    /// Compute the parameter's next value
    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        state: &mut StrategyState,
        rng: &mut R,
    ) -> f64;
}

/// Enum-based strategy for storage and name-addressable swapping
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DynamicStrategy {
    MutationRate(MutationRateStrategy),
    CrossoverRate(CrossoverRateStrategy),
    TournamentSize(TournamentSizeStrategy),
    ElitismCount(ElitismStrategy),
    PopulationSize(PopulationSizeStrategy),
    SelfTuning(SelfTuningStrategy),
    TimePhased(TimePhasedStrategy),
}

impl AdjustmentStrategy for DynamicStrategy {
    fn name(&self) -> &'static str {
        match self {
            Self::MutationRate(s) => s.name(),
            Self::CrossoverRate(s) => s.name(),
            Self::TournamentSize(s) => s.name(),
            Self::ElitismCount(s) => s.name(),
            Self::PopulationSize(s) => s.name(),
            Self::SelfTuning(s) => s.name(),
            Self::TimePhased(s) => s.name(),
        }
    }

    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        state: &mut StrategyState,
        rng: &mut R,
    ) -> f64 {
        match self {
            Self::MutationRate(s) => s.next_value(current, ctx, state, rng),
            Self::CrossoverRate(s) => s.next_value(current, ctx, state, rng),
            Self::TournamentSize(s) => s.next_value(current, ctx, state, rng),
            Self::ElitismCount(s) => s.next_value(current, ctx, state, rng),
            Self::PopulationSize(s) => s.next_value(current, ctx, state, rng),
            Self::SelfTuning(s) => s.next_value(current, ctx, state, rng),
            Self::TimePhased(s) => s.next_value(current, ctx, state, rng),
        }
    }
}

impl From<MutationRateStrategy> for DynamicStrategy {
    fn from(s: MutationRateStrategy) -> Self {
        Self::MutationRate(s)
    }
}

impl From<CrossoverRateStrategy> for DynamicStrategy {
    fn from(s: CrossoverRateStrategy) -> Self {
        Self::CrossoverRate(s)
    }
}

impl From<TournamentSizeStrategy> for DynamicStrategy {
    fn from(s: TournamentSizeStrategy) -> Self {
        Self::TournamentSize(s)
    }
}

impl From<ElitismStrategy> for DynamicStrategy {
    fn from(s: ElitismStrategy) -> Self {
        Self::ElitismCount(s)
    }
}

impl From<PopulationSizeStrategy> for DynamicStrategy {
    fn from(s: PopulationSizeStrategy) -> Self {
        Self::PopulationSize(s)
    }
}

impl From<SelfTuningStrategy> for DynamicStrategy {
    fn from(s: SelfTuningStrategy) -> Self {
        Self::SelfTuning(s)
    }
}

impl From<TimePhasedStrategy> for DynamicStrategy {
    fn from(s: TimePhasedStrategy) -> Self {
        Self::TimePhased(s)
    }
}
