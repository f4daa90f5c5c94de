//! Structured error kinds for the temporal algebra engine (spec §7).
//!
//! Every fallible entry point returns `Result<_, TemporalError>` instead of
//! signalling through a process-wide channel and relying on the host to
//! unwind: panics are reserved for invariant violations that indicate a bug
//! in this crate, never for caller-supplied bad input.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::BaseType;

/// One of the abstract error kinds named in spec §7.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemporalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("ordering violation at {t}: {message}")]
    OrderingViolation { t: DateTime<Utc>, message: String },

    #[error("value disagreement at {t}: {message}")]
    ValueDisagreement { t: DateTime<Utc>, message: String },

    #[error("interpolation mismatch: {0}")]
    InterpolationMismatch(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch { expected: BaseType, found: BaseType },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TemporalError>;
