//! MraError: Unified error type for mra-derivative public APIs
//!
//! Every fallible operation in the crate returns `Result<_, MraError>`. The
//! variants fall into four families (see [`ErrorKind`]): configuration errors
//! caught at construction, precondition errors caught before any work is
//! spawned, protocol errors signalling a broken internal invariant, and
//! collaborator failures reported by the store or the scheduler.

use thiserror::Error;

/// Coarse classification of an [`MraError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed operator or tree configuration.
    Configuration,
    /// Operation requested on an input that cannot be traversed as-is.
    Precondition,
    /// An internal invariant was violated at run time.
    Protocol,
    /// The store or scheduler failed to serve a request.
    Collaborator,
}

/// Unified error type for mra-derivative operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MraError {
    /// Boundary matrix does not have `NDIM` rows of two sides each.
    #[error("boundary conditions: expected {expected}x2 matrix, got {rows} rows ({detail})")]
    BoundaryShape {
        expected: usize,
        rows: usize,
        detail: String,
    },
    /// Boundary code outside `0..=5`.
    #[error("boundary conditions: invalid code {0}")]
    InvalidBoundaryCode(i32),
    /// Unknown boundary code name.
    #[error("boundary conditions: unknown code name `{0}`")]
    UnknownBoundaryName(String),
    /// Exactly one side of an axis is periodic.
    #[error("boundary conditions: axis {axis} is periodic on one side only")]
    UnpairedPeriodic { axis: usize },
    /// Axis index outside `0..NDIM`.
    #[error("axis {axis} out of range for a {ndim}-dimensional tree")]
    InvalidAxis { axis: usize, ndim: usize },
    /// Wavelet order outside the supported range.
    #[error("wavelet order {0} is not supported")]
    InvalidOrder(usize),
    /// Simulation cell has the wrong arity or a non-positive width.
    #[error("invalid simulation cell: {0}")]
    InvalidCell(String),
    /// A coefficient block does not have the expected shape.
    #[error("coefficient block shape mismatch: expected {expected} values, got {found}")]
    BlockShape { expected: usize, found: usize },
    /// Two trees that must share a layout do not.
    #[error("incompatible trees: {0}")]
    IncompatibleTrees(String),
    /// Differentiation requested on a compressed tree without permission to reconstruct.
    #[error("cannot differentiate a compressed function without reconstructing it first")]
    CompressedInput,
    /// The tree failed structural verification.
    #[error("invalid tree at {key}: {reason}")]
    InvalidTree { key: String, reason: String },
    /// Periodic wrap-around requested on an axis whose other side is not periodic.
    #[error("periodic wrap on axis {axis} but boundary codes are {left}:{right}")]
    PeriodicMismatch {
        axis: usize,
        left: &'static str,
        right: &'static str,
    },
    /// An output key was published twice during one application.
    #[error("output entry for {0} published twice")]
    DuplicatePublication(String),
    /// A deferred value was resolved a second time.
    #[error("deferred value resolved twice")]
    AlreadyResolved,
    /// A lookup walked past the root without finding a node.
    #[error("no node found at or above {0}")]
    MissingNode(String),
    /// A scheduled task panicked.
    #[error("task on worker {worker} panicked: {message}")]
    TaskPanicked { worker: usize, message: String },
    /// Task submitted to a worker that does not exist.
    #[error("worker {worker} out of range (world size {size})")]
    InvalidWorker { worker: usize, size: usize },
    /// The runtime has shut down.
    #[error("runtime has shut down")]
    ShutDown,
    /// A worker thread could not be started.
    #[error("failed to start worker {worker}: {message}")]
    Spawn { worker: usize, message: String },
}

impl MraError {
    /// Which family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use MraError::*;
        match self {
            BoundaryShape { .. }
            | InvalidBoundaryCode(_)
            | UnknownBoundaryName(_)
            | UnpairedPeriodic { .. }
            | InvalidAxis { .. }
            | InvalidOrder(_)
            | InvalidCell(_)
            | BlockShape { .. }
            | IncompatibleTrees(_) => ErrorKind::Configuration,
            CompressedInput | InvalidTree { .. } => ErrorKind::Precondition,
            PeriodicMismatch { .. } | DuplicatePublication(_) | AlreadyResolved => {
                ErrorKind::Protocol
            }
            MissingNode(_)
            | TaskPanicked { .. }
            | InvalidWorker { .. }
            | ShutDown
            | Spawn { .. } => ErrorKind::Collaborator,
        }
    }

    /// True if the error is fatal before any distributed work starts.
    pub fn is_construction_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Precondition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            MraError::UnpairedPeriodic { axis: 0 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(MraError::CompressedInput.kind(), ErrorKind::Precondition);
        assert_eq!(MraError::AlreadyResolved.kind(), ErrorKind::Protocol);
        assert_eq!(
            MraError::MissingNode("(0, [0])".into()).kind(),
            ErrorKind::Collaborator
        );
        assert!(MraError::InvalidOrder(0).is_construction_error());
        assert!(!MraError::ShutDown.is_construction_error());
    }
}
