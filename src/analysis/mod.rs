//! Adaptation analysis

pub mod analyzer;
pub mod stats;

pub use analyzer::{
    AdaptationAnalyzer, AdaptationSummary, MetricKind, ParameterCorrelation, ParameterTrend,
    SignificantAdaptation, TrendDirection,
};
