//! Error types for the auth flow core.

use crate::field::FieldName;
use crate::flow::FlowStep;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Navigation and controller contract violations.
///
/// These are raised for intents the current step cannot honour. They never
/// change flow state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Unknown role identifier: {0}")]
    InvalidRole(String),

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: FlowStep, to: FlowStep },

    #[error("Field {field} does not belong to step {step}")]
    UnknownField { step: FlowStep, field: FieldName },

    #[error("Step {step} has no form")]
    NoForm { step: FlowStep },
}

/// Failure reasons reported by an account service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("Request rejected: {reason}")]
    Rejected { reason: String },

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Account service unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors talking to a running flow runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Flow runtime has shut down")]
    Closed,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
