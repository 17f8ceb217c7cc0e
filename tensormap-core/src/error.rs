//! Error type shared by every fallible operation of the crate.

use thiserror::Error;

/// Errors raised when an operation would violate an invariant of labels, blocks or tensor maps.
///
/// Validation is eager: the failing call leaves all of its inputs unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Axis, shape or name-count disagreement.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The same entry (or block) appears more than once where uniqueness is required.
    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    /// A value can not be represented as a 32-bit signed integer.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Missing dimension name, missing selection match or out-of-range index.
    #[error("not found: {0}")]
    NotFound(String),

    /// A selection matched more than one block where exactly one was required.
    #[error("ambiguous selection: {0}")]
    Ambiguous(String),

    /// Lookup or set algebra attempted on a non-owning labels projection.
    #[error("can not call `{0}` on a labels view, call `to_owned` first")]
    InvalidOperationOnView(&'static str),

    /// A block already owned by a tensor map or another block was inserted again.
    #[error("ownership violation: {0}")]
    OwnershipViolation(String),

    /// Gradients of gradients.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Empty or repeated dimension name.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// offending name
        name: String,
        /// what is wrong with it
        reason: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
