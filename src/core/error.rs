use thiserror::Error;

/// Errors that stop an allocation run before it produces an outcome
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// Quota arithmetic has no meaning for this input (e.g. no slot-holders)
    #[error("Configuration error: {0}")]
    Configuration(String),
}
