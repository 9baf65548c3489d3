//! Operator selection policy

pub mod selection;

pub use selection::{OperatorPerformance, OperatorSelectionPolicy, PolicyConfig};
