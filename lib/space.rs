//! Labeled tensor-product spaces and their operator catalogues.
//!
//! A [`Factor`] is an atomic Hilbert-space factor: a dimension, a display
//! name, and an insertion-ordered catalogue of named sparse operators acting
//! on it (always including the identity under `"i"`). A [`Space`] is an
//! ordered tensor product of factors; its catalogue holds joint operators
//! built by Kronecker-composing one named operator from each operand.
//!
//! Spaces support lifting a single-factor operator into the joint space
//! ([`Space::lift`]) and reduction by partial trace ([`Space::ptrace`]),
//! which re-enters the pipeline as a smaller `Space`/operator pair.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("factor dimension must be positive")]
    InvalidDimension,

    #[error("unknown operator name '{0}'")]
    UnknownOperatorName(String),

    #[error("malformed indexing: {0}")]
    MalformedIndexing(String),

    #[error("subsystem position {0} is out of bounds for {1} factor(s)")]
    InvalidSubsystem(usize, usize),

    #[error("unsupported rank: expected rank-{0} data, got rank-{1}")]
    UnsupportedRank(usize, usize),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}
pub type SpaceResult<T> = Result<T, SpaceError>;

pub(crate) mod factor;
pub use factor::*;

#[allow(clippy::module_inception)]
pub(crate) mod space;
pub use space::*;

pub(crate) mod systems;
pub use systems::*;

pub(crate) mod ptrace;
