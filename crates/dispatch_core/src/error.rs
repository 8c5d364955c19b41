//! Engine error taxonomy.
//!
//! Every externally-invoked operation returns one of these three kinds, or
//! succeeds. A ride settling into `failed` is a normal result value, not an
//! error — see the ride lifecycle module.

use thiserror::Error;

/// The error type returned by every operation in the façade (§6).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requested transition is illegal in the current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Coordinates out of range, or a required field was empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Shorthand result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
