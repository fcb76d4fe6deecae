//! Error types.
//!
//! Every numeric routine in this crate reports exactly one failure kind:
//! [`ShapeError::ShapeMismatch`]. Shapes are checked before any arithmetic
//! runs, so an error always means the caller supplied arrays whose
//! dimensions disagree. Nothing here is retryable.
//!
//! Weight persistence has its own [`ModelIoError`], which wraps I/O and
//! format failures.

use thiserror::Error;

/// Result alias used by the numeric routines.
pub type Result<T> = core::result::Result<T, ShapeError>;

/// Mutually inconsistent array dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// `context` names the operand that failed the check.
    #[error("shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

impl ShapeError {
    pub(crate) fn mismatch(
        context: &'static str,
        expected: impl Into<Vec<usize>>,
        found: impl Into<Vec<usize>>,
    ) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Failures while saving or loading weights.
#[derive(Debug, Error)]
pub enum ModelIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid magic header")]
    InvalidMagic,

    /// The header is malformed, a payload is shorter than its header claims,
    /// or the tensors do not form a weight pair.
    #[error("corrupt weight file: {0}")]
    Corrupt(&'static str),
}
