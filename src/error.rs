//! Error taxonomy for the reasoning kernel.
//!
//! Every fallible entry point returns a value, never an unwind.
//! `InternalError` is reserved for invariant violations that
//! user input cannot trigger; everything else is a normal, expected
//! outcome of malformed input, resource exhaustion, or a closed-world gap.

use thiserror::Error;

/// Top-level error type for the core.
#[derive(Debug, Clone, Error)]
pub enum SysError {
    /// Vectors from different strategies or geometries were combined.
    #[error("incompatible vectors: {reason}")]
    IncompatibleVectors { reason: String },

    /// A geometry was requested that is not a positive multiple of 32.
    #[error("bad geometry: {geometry} is not divisible by 32")]
    BadGeometry { geometry: u32 },

    /// `learn`/`query` referenced an operator outside the catalog with
    /// `autoDeclareUnknownOperators = false`.
    #[error("unknown operator: {operator}")]
    UnknownOperator { operator: String },

    /// `rejectContradictions = true` and the statement directly contradicts
    /// an existing fact via the negation index.
    #[error("contradiction: {operator}({args}) conflicts with a stored negation")]
    Contradiction { operator: String, args: String },

    /// A statement could not be parsed.
    #[error("parse error at statement {index}: {message}")]
    Parse { index: usize, message: String },

    /// An internal invariant was violated. Never provoked by user input;
    /// the Session is left untouched and the caller should treat this as a
    /// bug report.
    #[error("internal invariant violated: {detail}")]
    InternalError { detail: String },
}

impl SysError {
    pub fn incompatible(reason: impl Into<String>) -> Self {
        SysError::IncompatibleVectors {
            reason: reason.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        SysError::InternalError {
            detail: detail.into(),
        }
    }
}

pub type SysResult<T> = Result<T, SysError>;
