//! Time-phased strategy
//!
//! Schedule-based rather than feedback-based control: the parameter takes
//! one of three fixed values depending on which fraction of the expected
//! run has elapsed. Useful for knobs known a priori to want a schedule,
//! such as a high early mutation rate annealed for refinement later.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::StrategyContext;
use super::traits::{AdjustmentStrategy, StrategyState};

/// Early/middle/late fixed values over an expected run length
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimePhasedStrategy {
    /// Value during the early phase
    pub early_value: f64,
    /// Value during the middle phase
    pub middle_value: f64,
    /// Value during the late phase
    pub late_value: f64,
    /// Expected total generations for the run
    pub expected_generations: u64,
    /// Fraction of the run considered early
    pub early_fraction: f64,
    /// Fraction of the run after which the late phase begins
    pub late_fraction: f64,
}

impl TimePhasedStrategy {
    /// Create a schedule over the given expected run length
    pub fn new(early: f64, middle: f64, late: f64, expected_generations: u64) -> Self {
        Self {
            early_value: early,
            middle_value: middle,
            late_value: late,
            expected_generations,
            early_fraction: 1.0 / 3.0,
            late_fraction: 2.0 / 3.0,
        }
    }

    /// Set the phase boundaries as run fractions
    pub fn with_fractions(mut self, early: f64, late: f64) -> Self {
        self.early_fraction = early;
        self.late_fraction = late;
        self
    }

    /// Value for a given generation
    pub fn value_at(&self, generation: u64) -> f64 {
        if self.expected_generations == 0 {
            return self.early_value;
        }
        let progress = generation as f64 / self.expected_generations as f64;
        if progress < self.early_fraction {
            self.early_value
        } else if progress < self.late_fraction {
            self.middle_value
        } else {
            self.late_value
        }
    }
}

impl AdjustmentStrategy for TimePhasedStrategy {
    fn name(&self) -> &'static str {
        "time_phased"
    }

    fn next_value<R: Rng>(
        &self,
        _current: f64,
        ctx: &StrategyContext<'_>,
        _state: &mut StrategyState,
        _rng: &mut R,
    ) -> f64 {
        self.value_at(ctx.metrics.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_phase_boundaries() {
        let schedule = TimePhasedStrategy::new(0.9, 0.6, 0.3, 90);

        assert_relative_eq!(schedule.value_at(0), 0.9);
        assert_relative_eq!(schedule.value_at(29), 0.9);
        assert_relative_eq!(schedule.value_at(30), 0.6);
        assert_relative_eq!(schedule.value_at(59), 0.6);
        assert_relative_eq!(schedule.value_at(60), 0.3);
        assert_relative_eq!(schedule.value_at(200), 0.3);
    }

    #[test]
    fn test_custom_fractions() {
        let schedule = TimePhasedStrategy::new(1.0, 0.5, 0.1, 100).with_fractions(0.1, 0.9);

        assert_relative_eq!(schedule.value_at(5), 1.0);
        assert_relative_eq!(schedule.value_at(50), 0.5);
        assert_relative_eq!(schedule.value_at(95), 0.1);
    }

    #[test]
    fn test_zero_expected_generations() {
        let schedule = TimePhasedStrategy::new(0.9, 0.6, 0.3, 0);
        assert_relative_eq!(schedule.value_at(10), 0.9);
    }
}
