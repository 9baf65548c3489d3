//! General-purpose self-tuning strategy
//!
//! A hill climber over the parameter's own recent history: it remembers
//! which recently tried values produced the best fitness and moves toward
//! them, shrinking its step whenever the move direction reverses. With too
//! little data it takes a small randomized exploratory step instead. All
//! rolling state is held in the per-parameter [`StrategyState`].

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::context::StrategyContext;
use super::traits::{AdjustmentStrategy, StrategyState};

/// Windowed hill-climbing strategy with momentum damping
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfTuningStrategy {
    /// Number of `(value, fitness)` observations retained
    pub window_size: usize,
    /// Observations required before exploitation starts
    pub min_samples: usize,
    /// Generations to wait between adjustments
    pub cooldown: u64,
    /// Relative scale of the randomized exploratory step
    pub exploration_scale: f64,
    /// Relative scale of the initial hill-climbing step
    pub initial_step: f64,
    /// Step multiplier applied when the move direction reverses
    pub reversal_damping: f64,
}

impl Default for SelfTuningStrategy {
    fn default() -> Self {
        Self {
            window_size: 5,
            min_samples: 3,
            cooldown: 3,
            exploration_scale: 0.05,
            initial_step: 0.05,
            reversal_damping: 0.5,
        }
    }
}

impl SelfTuningStrategy {
    /// Create a strategy with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observation window size
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Set the adjustment cooldown
    pub fn with_cooldown(mut self, generations: u64) -> Self {
        self.cooldown = generations;
        self
    }

    /// Set exploration and initial step scales
    pub fn with_steps(mut self, exploration: f64, initial: f64) -> Self {
        self.exploration_scale = exploration;
        self.initial_step = initial;
        self
    }

    /// Absolute step derived from a relative scale and the current value
    fn scaled(&self, scale: f64, current: f64) -> f64 {
        scale * current.abs().max(scale)
    }
}

impl AdjustmentStrategy for SelfTuningStrategy {
    fn name(&self) -> &'static str {
        "self_tuning"
    }

    fn next_value<R: Rng>(
        &self,
        current: f64,
        ctx: &StrategyContext<'_>,
        state: &mut StrategyState,
        rng: &mut R,
    ) -> f64 {
        state.probe_window.push_back((current, ctx.metrics.best_fitness));
        while state.probe_window.len() > self.window_size {
            state.probe_window.pop_front();
        }

        let generation = ctx.metrics.generation;
        if let Some(last) = state.last_adjustment_generation {
            if generation.saturating_sub(last) < self.cooldown {
                return current;
            }
        }

        if state.probe_window.len() < self.min_samples {
            let noise: f64 = rng.sample(StandardNormal);
            state.last_adjustment_generation = Some(generation);
            return current + noise * self.scaled(self.exploration_scale, current);
        }

        let best_value = state
            .probe_window
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(value, _)| *value)
            .unwrap_or(current);

        let direction = (best_value - current).signum();
        if direction == 0.0 {
            return current;
        }

        let mut step = state
            .step_size
            .unwrap_or_else(|| self.scaled(self.initial_step, current));
        if state.last_direction != 0.0 && direction != state.last_direction {
            step *= self.reversal_damping;
        }

        state.step_size = Some(step);
        state.last_direction = direction;
        state.last_adjustment_generation = Some(generation);

        // Never overshoot the best observed value
        let delta = (best_value - current).abs().min(step);
        current + direction * delta
    }
}
