//! Error types for evo-adapt
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::metrics::OperatorType;

/// Error type for parameter store operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    /// Registration with an empty or inverted bound interval
    #[error("Invalid constraint for '{name}': min {min} must be below max {max}")]
    InvalidConstraint { name: String, min: f64, max: f64 },

    /// Default value outside the registered bounds
    #[error("Default {default} for '{name}' is outside [{min}, {max}]")]
    DefaultOutOfRange {
        name: String,
        default: f64,
        min: f64,
        max: f64,
    },

    /// A parameter name was registered twice
    #[error("Parameter '{0}' is already registered")]
    DuplicateParameter(String),

    /// Lookup of a name that was never registered
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// A value that is NaN or infinite was passed to the setter
    #[error("Non-finite value {value} for '{name}'")]
    NonFiniteValue { name: String, value: f64 },
}

/// Error type for operator selection policy operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    /// Selection requested for a category with no registered variants
    #[error("No operators registered for category {0}")]
    NoOperatorsRegistered(OperatorType),

    /// Performance update for a variant that was never registered
    #[error("Unknown operator '{name}' in category {category}")]
    UnknownOperator {
        category: OperatorType,
        name: String,
    },

    /// The same variant name registered twice within one category
    #[error("Operator '{name}' already registered in category {category}")]
    DuplicateOperator {
        category: OperatorType,
        name: String,
    },
}

/// Top-level error type for adaptive control operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdaptError {
    /// Parameter store error
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Operator selection policy error
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
}

/// Result type alias for adaptive control operations
pub type AdaptResult<T> = Result<T, AdaptError>;
