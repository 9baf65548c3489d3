//! Post-hoc analysis of recorded adaptation behavior
//!
//! [`AdaptationAnalyzer`] digests the events, snapshots, and metrics a
//! controller accumulated over a run and answers the questions a user tuning
//! the tuner cares about: which way each parameter drifted, which parameter
//! movements actually tracked search progress, and which individual
//! adaptations were large enough to matter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::stats;
use crate::controller::{AdaptiveController, ParameterAdaptationEvent, ParameterSnapshot};
use crate::metrics::EvolutionMetrics;

/// Maximum generation distance when pairing parameter and metric samples
const ALIGNMENT_TOLERANCE: u64 = 2;

/// Slope magnitude below which a series is not considered directional
const TREND_SLOPE_EPSILON: f64 = 1e-3;

/// Coefficient of variation above which a flat series counts as fluctuating
const FLUCTUATION_CV: f64 = 0.1;

/// Minimum aligned pairs for a correlation to be reported
const MIN_CORRELATION_SAMPLES: usize = 3;

/// Recent samples that must all sit at a bound for a parameter to count as pinned
const PINNED_SAMPLE_WINDOW: usize = 3;

/// Adaptation events before a strategy's lack of correlation is worth flagging
const MIN_ADAPTATIONS_FOR_REVIEW: usize = 5;

/// Correlation magnitude below which a strategy shows no metric coupling
const WEAK_CORRELATION: f64 = 0.25;

/// Overall direction of a parameter's recorded values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    /// No meaningful slope and little spread
    Stable,
    /// No meaningful slope but substantial spread
    Fluctuating,
}

/// Metric series a parameter can be correlated against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    BestFitness,
    AverageFitness,
    Diversity,
    Convergence,
}

impl MetricKind {
    /// All correlatable metrics
    pub const ALL: [MetricKind; 4] = [
        Self::BestFitness,
        Self::AverageFitness,
        Self::Diversity,
        Self::Convergence,
    ];

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestFitness => "best_fitness",
            Self::AverageFitness => "average_fitness",
            Self::Diversity => "diversity",
            Self::Convergence => "convergence",
        }
    }

    fn extract(&self, metrics: &EvolutionMetrics) -> f64 {
        match self {
            Self::BestFitness => metrics.best_fitness,
            Self::AverageFitness => metrics.average_fitness,
            Self::Diversity => metrics.diversity_score,
            Self::Convergence => metrics.convergence_rate,
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trend analysis for one parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterTrend {
    /// Parameter name
    pub parameter: String,
    /// Overall direction
    pub direction: TrendDirection,
    /// Least-squares slope of value over generation
    pub slope: f64,
    /// Coefficient of variation of the recorded values
    pub volatility: f64,
    /// Number of samples behind the analysis
    pub samples: usize,
}

/// Correlation between one parameter and one metric
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterCorrelation {
    /// Parameter name
    pub parameter: String,
    /// Metric it was correlated against
    pub metric: MetricKind,
    /// Pearson correlation coefficient
    pub correlation: f64,
    /// Number of aligned sample pairs
    pub samples: usize,
}

/// An adaptation whose magnitude stood out from the rest of the run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignificantAdaptation {
    /// The underlying event
    pub event: ParameterAdaptationEvent,
    /// Absolute change magnitude that qualified it
    pub magnitude: f64,
}

/// High-level digest of a run's adaptation behavior
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaptationSummary {
    /// Total recorded adaptation events
    pub total_adaptations: usize,
    /// Parameter with the most events, ties broken alphabetically
    pub most_adapted_parameter: Option<String>,
    /// Correlation with the largest magnitude
    pub strongest_correlation: Option<ParameterCorrelation>,
    /// Per-parameter trends
    pub trends: Vec<ParameterTrend>,
    /// Rule-based tuning suggestions
    pub recommendations: Vec<String>,
}

/// Analyzer over a run's recorded adaptation data
#[derive(Clone, Debug, Default)]
pub struct AdaptationAnalyzer {
    events: Vec<ParameterAdaptationEvent>,
    snapshots: Vec<ParameterSnapshot>,
    metrics: Vec<EvolutionMetrics>,
    constraints: BTreeMap<String, (f64, f64)>,
}

impl AdaptationAnalyzer {
    /// Build an analyzer from raw recordings, oldest first
    pub fn new(
        events: Vec<ParameterAdaptationEvent>,
        snapshots: Vec<ParameterSnapshot>,
        metrics: Vec<EvolutionMetrics>,
    ) -> Self {
        Self {
            events,
            snapshots,
            metrics,
            constraints: BTreeMap::new(),
        }
    }

    /// Attach parameter bounds so the summary can flag pinned parameters
    pub fn with_constraints(mut self, constraints: BTreeMap<String, (f64, f64)>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Build an analyzer from a controller's current recordings
    pub fn from_controller(controller: &AdaptiveController) -> Self {
        let store = controller.store();
        let mut constraints = BTreeMap::new();
        for name in store.names() {
            if let Ok(bounds) = store.constraints(&name) {
                constraints.insert(name, bounds);
            }
        }
        Self::new(
            controller.adaptation_history(),
            controller.snapshots(),
            store.metrics_history(),
        )
        .with_constraints(constraints)
    }

    /// Per-parameter value series keyed by name, samples as (generation, value)
    fn parameter_series(&self) -> BTreeMap<String, Vec<(u64, f64)>> {
        let mut series: BTreeMap<String, Vec<(u64, f64)>> = BTreeMap::new();
        for snapshot in &self.snapshots {
            for (name, value) in &snapshot.parameters {
                series
                    .entry(name.clone())
                    .or_default()
                    .push((snapshot.generation, *value));
            }
        }
        series
    }

    /// Trend of every parameter seen in the snapshots
    pub fn parameter_trends(&self) -> Vec<ParameterTrend> {
        self.parameter_series()
            .into_iter()
            .map(|(parameter, samples)| {
                let points: Vec<(f64, f64)> = samples
                    .iter()
                    .map(|(generation, value)| (*generation as f64, *value))
                    .collect();
                let values: Vec<f64> = samples.iter().map(|(_, value)| *value).collect();

                let slope = stats::linear_trend(&points).unwrap_or(0.0);
                let volatility = stats::coefficient_of_variation(&values);
                let direction = if slope >= TREND_SLOPE_EPSILON {
                    TrendDirection::Increasing
                } else if slope <= -TREND_SLOPE_EPSILON {
                    TrendDirection::Decreasing
                } else if volatility > FLUCTUATION_CV {
                    TrendDirection::Fluctuating
                } else {
                    TrendDirection::Stable
                };

                ParameterTrend {
                    parameter,
                    direction,
                    slope,
                    volatility,
                    samples: samples.len(),
                }
            })
            .collect()
    }

    /// Metric sample closest to a generation, within the alignment tolerance
    fn aligned_metric(&self, generation: u64) -> Option<&EvolutionMetrics> {
        self.metrics
            .iter()
            .map(|m| (m.generation.abs_diff(generation), m))
            .filter(|(distance, _)| *distance <= ALIGNMENT_TOLERANCE)
            .min_by_key(|(distance, m)| (*distance, m.generation))
            .map(|(_, m)| m)
    }

    /// Pearson correlation of every parameter against every metric
    ///
    /// Parameter samples pair with the metric sample of the same generation,
    /// or the nearest within two generations. Pairs below three samples or
    /// with degenerate variance are omitted.
    pub fn parameter_metric_correlations(&self) -> Vec<ParameterCorrelation> {
        let mut correlations = Vec::new();
        for (parameter, samples) in self.parameter_series() {
            let mut values = Vec::with_capacity(samples.len());
            let mut aligned: Vec<&EvolutionMetrics> = Vec::with_capacity(samples.len());
            for (generation, value) in &samples {
                if let Some(metric) = self.aligned_metric(*generation) {
                    values.push(*value);
                    aligned.push(metric);
                }
            }
            if values.len() < MIN_CORRELATION_SAMPLES {
                continue;
            }

            for kind in MetricKind::ALL {
                let series: Vec<f64> = aligned.iter().map(|m| kind.extract(m)).collect();
                if let Some(correlation) = stats::pearson_correlation(&values, &series) {
                    correlations.push(ParameterCorrelation {
                        parameter: parameter.clone(),
                        metric: kind,
                        correlation,
                        samples: values.len(),
                    });
                }
            }
        }
        correlations
    }

    /// Adaptations whose magnitude reaches the 75th percentile of their own
    /// parameter's recorded changes
    ///
    /// Each parameter gets its own threshold, interpolated over the absolute
    /// changes of that parameter alone, so significance follows every
    /// parameter's natural scale instead of one global cutoff. The
    /// comparison is inclusive.
    pub fn significant_adaptations(&self) -> Vec<SignificantAdaptation> {
        let mut magnitudes: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for event in &self.events {
            magnitudes
                .entry(event.parameter.as_str())
                .or_default()
                .push((event.new_value - event.old_value).abs());
        }
        let thresholds: BTreeMap<&str, f64> = magnitudes
            .iter()
            .filter_map(|(name, group)| stats::percentile(group, 75.0).map(|t| (*name, t)))
            .collect();

        self.events
            .iter()
            .filter_map(|event| {
                let magnitude = (event.new_value - event.old_value).abs();
                let threshold = thresholds.get(event.parameter.as_str())?;
                (magnitude >= *threshold).then(|| SignificantAdaptation {
                    event: event.clone(),
                    magnitude,
                })
            })
            .collect()
    }

    /// Digest of the entire run with rule-based recommendations
    pub fn adaptation_summary(&self) -> AdaptationSummary {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.parameter.as_str()).or_default() += 1;
        }
        let most_adapted_parameter = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(name, _)| name.to_string());

        let correlations = self.parameter_metric_correlations();
        let strongest_correlation = correlations
            .iter()
            .max_by(|a, b| {
                a.correlation
                    .abs()
                    .partial_cmp(&b.correlation.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned();

        let trends = self.parameter_trends();
        let mut recommendations = Vec::new();

        if self.events.is_empty() {
            recommendations.push(
                "No adaptations were recorded; check that adaptation is enabled and that \
                 parameter bounds leave room to move."
                    .to_string(),
            );
        }
        for trend in &trends {
            if trend.direction == TrendDirection::Fluctuating {
                recommendations.push(format!(
                    "Parameter '{}' fluctuates without a clear direction; consider a \
                     conservative adaptation level or tighter bounds.",
                    trend.parameter
                ));
            }
        }
        for (parameter, samples) in self.parameter_series() {
            let Some(&(min, max)) = self.constraints.get(&parameter) else {
                continue;
            };
            let recent: Vec<f64> = samples
                .iter()
                .rev()
                .take(PINNED_SAMPLE_WINDOW)
                .map(|(_, value)| *value)
                .collect();
            if recent.is_empty() {
                continue;
            }
            let tolerance = (max - min).abs() * 1e-6;
            if recent.iter().all(|v| (v - min).abs() <= tolerance) {
                recommendations.push(format!(
                    "Parameter '{parameter}' is pinned at its lower bound {min}; consider \
                     widening the bounds."
                ));
            } else if recent.iter().all(|v| (v - max).abs() <= tolerance) {
                recommendations.push(format!(
                    "Parameter '{parameter}' is pinned at its upper bound {max}; consider \
                     widening the bounds."
                ));
            }
        }
        for correlation in &correlations {
            if correlation.metric == MetricKind::BestFitness && correlation.correlation > 0.5 {
                recommendations.push(format!(
                    "Increases of '{}' track fitness gains (r = {:.2}); its strategy \
                     appears effective.",
                    correlation.parameter, correlation.correlation
                ));
            }
            if correlation.metric == MetricKind::Diversity && correlation.correlation < -0.5 {
                recommendations.push(format!(
                    "'{}' moves against diversity (r = {:.2}); watch for premature \
                     convergence.",
                    correlation.parameter, correlation.correlation
                ));
            }
        }
        for (parameter, count) in &counts {
            if *count < MIN_ADAPTATIONS_FOR_REVIEW {
                continue;
            }
            let strongest = correlations
                .iter()
                .filter(|c| c.parameter == *parameter)
                .map(|c| c.correlation.abs())
                .fold(0.0f64, f64::max);
            if strongest < WEAK_CORRELATION {
                recommendations.push(format!(
                    "Parameter '{parameter}' was adapted {count} times with no meaningful \
                     correlation to any tracked metric; its strategy may not be helping."
                ));
            }
        }

        AdaptationSummary {
            total_adaptations: self.events.len(),
            most_adapted_parameter,
            strongest_correlation,
            trends,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn metrics_at(generation: u64, best: f64, diversity: f64) -> EvolutionMetrics {
        EvolutionMetrics::new(generation)
            .with_best_fitness(best)
            .with_average_fitness(best - 1.0)
            .with_diversity(diversity)
            .with_convergence(0.5)
            .with_population_size(100)
    }

    fn snapshot_at(generation: u64, value: f64) -> ParameterSnapshot {
        let mut parameters = BTreeMap::new();
        parameters.insert("mutation_rate".to_string(), value);
        ParameterSnapshot {
            parameters,
            metrics: metrics_at(generation, 0.0, 0.5),
            generation,
            timestamp_ms: 0,
        }
    }

    fn event_for(parameter: &str, old_value: f64, new_value: f64) -> ParameterAdaptationEvent {
        ParameterAdaptationEvent {
            parameter: parameter.to_string(),
            old_value,
            new_value,
            reason: parameter.to_string(),
            metrics_at_change: metrics_at(1, 0.0, 0.5),
            generation: 1,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn test_trend_detects_increase() {
        let snapshots: Vec<_> = (1..=10)
            .map(|g| snapshot_at(g, 0.05 + 0.01 * g as f64))
            .collect();
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, Vec::new());

        let trends = analyzer.parameter_trends();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Increasing);
        assert_relative_eq!(trends[0].slope, 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_trend_flat_series_is_stable() {
        let snapshots: Vec<_> = (1..=10).map(|g| snapshot_at(g, 0.05)).collect();
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, Vec::new());

        let trends = analyzer.parameter_trends();
        assert_eq!(trends[0].direction, TrendDirection::Stable);
        assert_relative_eq!(trends[0].volatility, 0.0);
    }

    #[test]
    fn test_trend_alternating_series_fluctuates() {
        let snapshots: Vec<_> = (1..=10)
            .map(|g| snapshot_at(g, if g % 2 == 0 { 0.1 } else { 0.3 }))
            .collect();
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, Vec::new());

        let trends = analyzer.parameter_trends();
        assert_eq!(trends[0].direction, TrendDirection::Fluctuating);
    }

    #[test]
    fn test_correlation_with_exact_alignment() {
        let snapshots: Vec<_> = (1..=8).map(|g| snapshot_at(g, 0.1 * g as f64)).collect();
        let metrics: Vec<_> = (1..=8).map(|g| metrics_at(g, g as f64, 0.5)).collect();
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, metrics);

        let correlations = analyzer.parameter_metric_correlations();
        let best = correlations
            .iter()
            .find(|c| c.metric == MetricKind::BestFitness)
            .unwrap();
        assert_relative_eq!(best.correlation, 1.0, epsilon = 1e-9);
        assert_eq!(best.samples, 8);
    }

    #[test]
    fn test_correlation_uses_nearest_within_tolerance() {
        // Metrics recorded at odd generations only; snapshots at even ones
        let snapshots: Vec<_> = [2u64, 4, 6, 8]
            .iter()
            .map(|&g| snapshot_at(g, 0.1 * g as f64))
            .collect();
        let metrics: Vec<_> = [1u64, 3, 5, 7]
            .iter()
            .map(|&g| metrics_at(g, g as f64, 0.5))
            .collect();
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, metrics);

        let correlations = analyzer.parameter_metric_correlations();
        assert!(correlations
            .iter()
            .any(|c| c.metric == MetricKind::BestFitness && c.correlation > 0.99));
    }

    #[test]
    fn test_correlation_requires_three_pairs() {
        let snapshots: Vec<_> = (1..=2).map(|g| snapshot_at(g, 0.1 * g as f64)).collect();
        let metrics: Vec<_> = (1..=2).map(|g| metrics_at(g, g as f64, 0.5)).collect();
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, metrics);

        assert!(analyzer.parameter_metric_correlations().is_empty());
    }

    #[test]
    fn test_significance_threshold_is_interpolated() {
        let events = vec![
            event_for("a", 1.0, 1.01),
            event_for("a", 1.0, 1.02),
            event_for("a", 1.0, 1.02),
            event_for("a", 1.0, 1.5),
        ];
        let analyzer = AdaptationAnalyzer::new(events, Vec::new(), Vec::new());

        // Threshold interpolates to 0.14, so only the 0.5 jump qualifies
        let significant = analyzer.significant_adaptations();
        assert_eq!(significant.len(), 1);
        assert_relative_eq!(significant[0].event.new_value, 1.5);
        assert_relative_eq!(significant[0].magnitude, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_significance_is_scaled_per_parameter() {
        // "a" moves on a millis scale, "b" on a tenths scale
        let events = vec![
            event_for("a", 0.1, 0.101),
            event_for("a", 0.1, 0.102),
            event_for("a", 0.1, 0.102),
            event_for("a", 0.1, 0.104),
            event_for("b", 1.0, 1.1),
            event_for("b", 1.0, 1.1),
            event_for("b", 1.0, 1.1),
            event_for("b", 1.0, 1.1),
        ];
        let analyzer = AdaptationAnalyzer::new(events, Vec::new(), Vec::new());

        let significant = analyzer.significant_adaptations();
        let for_a: Vec<_> = significant
            .iter()
            .filter(|s| s.event.parameter == "a")
            .collect();

        // "a"'s own threshold is 0.0025, so its 0.004 standout qualifies
        // despite "b"'s much larger changes
        assert_eq!(for_a.len(), 1);
        assert_relative_eq!(for_a[0].magnitude, 0.004, epsilon = 1e-9);
        assert_eq!(
            significant.iter().filter(|s| s.event.parameter == "b").count(),
            4
        );
    }

    #[test]
    fn test_significance_empty_events() {
        let analyzer = AdaptationAnalyzer::new(Vec::new(), Vec::new(), Vec::new());
        assert!(analyzer.significant_adaptations().is_empty());
    }

    #[test]
    fn test_summary_most_adapted_parameter() {
        let events = vec![
            event_for("mutation_rate", 0.05, 0.06),
            event_for("mutation_rate", 0.06, 0.07),
            event_for("crossover_rate", 0.8, 0.75),
        ];
        let analyzer = AdaptationAnalyzer::new(events, Vec::new(), Vec::new());

        let summary = analyzer.adaptation_summary();
        assert_eq!(summary.total_adaptations, 3);
        assert_eq!(
            summary.most_adapted_parameter.as_deref(),
            Some("mutation_rate")
        );
    }

    #[test]
    fn test_summary_flags_parameter_pinned_at_bound() {
        let snapshots: Vec<_> = (1..=6).map(|g| snapshot_at(g, 0.5)).collect();
        let mut constraints = BTreeMap::new();
        constraints.insert("mutation_rate".to_string(), (0.001, 0.5));
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, Vec::new())
            .with_constraints(constraints);

        let summary = analyzer.adaptation_summary();
        assert!(summary
            .recommendations
            .iter()
            .any(|r| r.contains("pinned at its upper bound")));
    }

    #[test]
    fn test_summary_does_not_flag_interior_values_as_pinned() {
        let snapshots: Vec<_> = (1..=6).map(|g| snapshot_at(g, 0.2)).collect();
        let mut constraints = BTreeMap::new();
        constraints.insert("mutation_rate".to_string(), (0.001, 0.5));
        let analyzer = AdaptationAnalyzer::new(Vec::new(), snapshots, Vec::new())
            .with_constraints(constraints);

        let summary = analyzer.adaptation_summary();
        assert!(!summary.recommendations.iter().any(|r| r.contains("pinned")));
    }

    #[test]
    fn test_summary_flags_uncorrelated_strategy() {
        // Alternating values against monotone fitness: weak correlation
        let snapshots: Vec<_> = (1..=8)
            .map(|g| snapshot_at(g, if g % 2 == 0 { 0.1 } else { 0.3 }))
            .collect();
        let metrics: Vec<_> = (1..=8).map(|g| metrics_at(g, g as f64, 0.5)).collect();
        let events: Vec<_> = (0..5)
            .map(|_| event_for("mutation_rate", 0.1, 0.3))
            .collect();
        let analyzer = AdaptationAnalyzer::new(events, snapshots, metrics);

        let summary = analyzer.adaptation_summary();
        assert!(summary
            .recommendations
            .iter()
            .any(|r| r.contains("no meaningful correlation")));
    }

    #[test]
    fn test_summary_uncorrelated_needs_enough_adaptations() {
        let snapshots: Vec<_> = (1..=8)
            .map(|g| snapshot_at(g, if g % 2 == 0 { 0.1 } else { 0.3 }))
            .collect();
        let metrics: Vec<_> = (1..=8).map(|g| metrics_at(g, g as f64, 0.5)).collect();
        let events: Vec<_> = (0..3)
            .map(|_| event_for("mutation_rate", 0.1, 0.3))
            .collect();
        let analyzer = AdaptationAnalyzer::new(events, snapshots, metrics);

        let summary = analyzer.adaptation_summary();
        assert!(!summary
            .recommendations
            .iter()
            .any(|r| r.contains("no meaningful correlation")));
    }

    #[test]
    fn test_summary_recommends_on_empty_run() {
        let analyzer = AdaptationAnalyzer::new(Vec::new(), Vec::new(), Vec::new());
        let summary = analyzer.adaptation_summary();
        assert!(!summary.recommendations.is_empty());
    }
}
