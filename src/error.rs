//! Error kinds shared across the crate.
//!
//! Component operations fail fast on violated preconditions; the runner
//! catches at the event boundary and moves on to the next record. A vertex
//! that simply fails to truth-match is not an error — it is recorded as `-1`
//! in the matching vector.

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All failure kinds produced by library components.
#[derive(Debug, Error)]
pub enum Error {
    /// An input sequence has the wrong length for the operation.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// An index is outside its valid range.
    #[error("index out of range: {0}")]
    Range(String),

    /// A constructor-time or option-resolution invariant was violated.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A record field was requested that the source was not opened with.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// Array text without the expected bracket structure.
    #[error("malformed array `{0}`")]
    MalformedArray(String),

    /// An array or scalar element failed numeric conversion.
    #[error("cannot parse `{0}` as a number")]
    NumberFormat(String),

    /// Transport-level failure in the record store.
    #[error("record source error: {0}")]
    Source(String),

    /// Structural integrity of a decay graph was violated.
    #[error("graph invariant violated: {0}")]
    GraphInvariant(String),

    /// The MC graph has no vertex with the decay-root index 2.
    #[error("decay root (mc index 2) not found")]
    RootMissing,

    /// File plumbing around the core components.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
